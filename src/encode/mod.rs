//! Serialization of composited pixels into the configured output format.

use std::path::Path;

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose};

use crate::config::settings::OutputFormat;
use crate::foundation::error::{SignplateError, SignplateResult};

/// One encoded composite: the artifact published to the preview and download sinks.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: OutputFormat,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime())
            .field("len", &self.bytes.len())
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint()))
            .finish()
    }
}

impl EncodedImage {
    /// Encoded file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the encoded file bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Output format the bytes are encoded in.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// MIME type of the bytes.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// `data:<mime>;base64,<payload>` form, usable directly as an image source or download link.
    pub fn to_data_uri(&self) -> String {
        let payload = general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.mime())
    }

    /// Stable 64-bit content hash of the encoded bytes.
    pub fn fingerprint(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&self.bytes)
    }

    /// Write the bytes to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> SignplateResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write image '{}'", path.display()))?;
        Ok(())
    }

    /// Write the [`data:` URI](Self::to_data_uri) text to `path`, creating parent directories.
    pub fn save_data_uri(&self, path: &Path) -> SignplateResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, self.to_data_uri())
            .with_context(|| format!("write data uri '{}'", path.display()))?;
        Ok(())
    }
}

/// Create `path`'s parent directory if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> SignplateResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode straight-alpha RGBA8 pixels.
///
/// JPEG has no alpha channel; pixels are flattened onto opaque black first.
pub(crate) fn encode_rgba8(
    rgba: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
) -> SignplateResult<EncodedImage> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba.len() != expected {
        return Err(SignplateError::encode(format!(
            "rgba buffer has {} bytes, expected {expected}",
            rgba.len()
        )));
    }

    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = flatten_onto_black(rgba);
            let img = image::RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| SignplateError::encode("rgb buffer size mismatch"))?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
            img.write_with_encoder(encoder)
                .map_err(|e| SignplateError::encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            let img = image::RgbaImage::from_raw(width, height, rgba.to_vec())
                .ok_or_else(|| SignplateError::encode("rgba buffer size mismatch"))?;
            let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
            img.write_with_encoder(encoder)
                .map_err(|e| SignplateError::encode(format!("png: {e}")))?;
        }
    }

    Ok(EncodedImage { bytes, format })
}

fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        for &c in &px[..3] {
            rgb.push(((u16::from(c) * a + 127) / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encode.rs"]
mod tests;
