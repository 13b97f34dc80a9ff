use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::SourceImage;
use crate::assets::color::ColorDef;
use crate::foundation::error::{SignplateError, SignplateResult};

/// Default JPEG quality, matching the browser canvas default of 0.92.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;
/// Default padding between the caption and the bottom/right image edges.
pub const DEFAULT_PADDING_PX: f32 = 30.0;

/// Font size and family parsed from a CSS-like shorthand such as `"32px Arial"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font size in pixels.
    pub size_px: f32,
    /// Requested family name. Informational only: glyphs always come from the font file.
    pub family: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            size_px: 32.0,
            family: "sans-serif".to_owned(),
        }
    }
}

impl FromStr for FontDescriptor {
    type Err = SignplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (size, family) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let size = size.strip_suffix("px").ok_or_else(|| {
            SignplateError::validation(format!("font \"{s}\" must start with a px size"))
        })?;
        let size_px: f32 = size
            .parse()
            .map_err(|_| SignplateError::validation(format!("invalid font size \"{size}\"")))?;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SignplateError::validation(
                "font size must be finite and > 0",
            ));
        }
        let family = family.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if family.is_empty() {
            return Err(SignplateError::validation(format!(
                "font \"{s}\" is missing a family"
            )));
        }
        Ok(Self {
            size_px,
            family: family.to_owned(),
        })
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// Encoding of the exported composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy JPEG; alpha is flattened onto black.
    Jpeg {
        /// Quality in `1..=100`.
        quality: u8,
    },
    /// Lossless PNG with alpha.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// Resolve a MIME type string such as `"image/jpeg"`.
    pub fn from_mime(mime: &str, jpeg_quality: u8) -> SignplateResult<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => {
                if !(1..=100).contains(&jpeg_quality) {
                    return Err(SignplateError::validation(
                        "jpeg quality must be in 1..=100",
                    ));
                }
                Ok(Self::Jpeg {
                    quality: jpeg_quality,
                })
            }
            "image/png" => Ok(Self::Png),
            other => Err(SignplateError::validation(format!(
                "unsupported output format \"{other}\" (expected image/jpeg or image/png)"
            ))),
        }
    }

    /// MIME type used in data URIs.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// JSON-facing text settings. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSettingsDef {
    /// Font shorthand, e.g. `"32px Arial"`.
    #[serde(default)]
    pub font: Option<String>,
    /// Path to the font file (TTF/OTF). Relative paths resolve against the settings file.
    #[serde(default)]
    pub font_source: Option<PathBuf>,
    /// Caption colour.
    #[serde(default)]
    pub color: Option<ColorDef>,
}

/// JSON-facing image settings. Width and height are never configurable: they come from the image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSettingsDef {
    /// Output MIME type.
    #[serde(default)]
    pub format: Option<String>,
    /// JPEG quality in `1..=100`.
    #[serde(default)]
    pub quality: Option<u8>,
    /// Padding in pixels.
    #[serde(default)]
    pub padding: Option<f32>,
}

/// Human-edited settings file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsDef {
    /// Caption styling.
    #[serde(default)]
    pub text: TextSettingsDef,
    /// Output options.
    #[serde(default)]
    pub image: ImageSettingsDef,
}

impl SettingsDef {
    /// Parse settings from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SignplateResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SignplateError::validation(format!("parse settings JSON: {e}")))
    }

    /// Parse settings from a JSON file. A relative `font_source` is resolved against the file's
    /// directory.
    pub fn from_path(path: impl AsRef<Path>) -> SignplateResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SignplateError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        let mut def = Self::from_reader(BufReader::new(f))?;
        if let (Some(src), Some(dir)) = (def.text.font_source.as_mut(), path.parent())
            && src.is_relative()
        {
            *src = dir.join(&*src);
        }
        Ok(def)
    }
}

/// Caption styling resolved from [`TextSettingsDef`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextSettings {
    /// Font size and family.
    pub font: FontDescriptor,
    /// Font file supplying the glyphs.
    pub font_source: PathBuf,
    /// Caption colour.
    pub color: ColorDef,
}

/// Output geometry and encoding resolved from [`ImageSettingsDef`] and the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    /// Surface width; equal to the source image's natural width.
    pub width: u32,
    /// Surface height; equal to the source image's natural height.
    pub height: u32,
    /// Output encoding.
    pub format: OutputFormat,
    /// Padding in pixels between caption and bottom/right edges.
    pub padding: f32,
}

/// Immutable session configuration.
///
/// Built once after the source image has loaded; never mutated afterwards. Components borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Caption styling.
    pub text: TextSettings,
    /// Output geometry and encoding.
    pub image: ImageSettings,
}

impl Settings {
    /// Resolve settings for a loaded image.
    pub fn for_image(def: &SettingsDef, image: &SourceImage) -> SignplateResult<Self> {
        Self::resolve(def, image.width(), image.height())
    }

    /// Resolve settings for a surface of `width` x `height`.
    pub fn resolve(def: &SettingsDef, width: u32, height: u32) -> SignplateResult<Self> {
        if width == 0 || height == 0 {
            return Err(SignplateError::validation(
                "image width and height must be > 0",
            ));
        }

        let font = match &def.text.font {
            Some(s) => s.parse()?,
            None => FontDescriptor::default(),
        };
        let font_source = def.text.font_source.clone().ok_or_else(|| {
            SignplateError::validation("text.font_source is required (no system fonts are used)")
        })?;

        let padding = def.image.padding.unwrap_or(DEFAULT_PADDING_PX);
        if !padding.is_finite() || padding < 0.0 {
            return Err(SignplateError::validation(
                "padding must be finite and >= 0",
            ));
        }

        let quality = def.image.quality.unwrap_or(DEFAULT_JPEG_QUALITY);
        let format = match &def.image.format {
            Some(mime) => OutputFormat::from_mime(mime, quality)?,
            None => OutputFormat::from_mime("image/jpeg", quality)?,
        };

        Ok(Self {
            text: TextSettings {
                font,
                font_source,
                color: def.text.color.unwrap_or_default(),
            },
            image: ImageSettings {
                width,
                height,
                format,
                padding,
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
