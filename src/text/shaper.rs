use std::borrow::Cow;

use anyhow::Context as _;

use crate::assets::color::ColorDef;
use crate::config::settings::TextSettings;
use crate::foundation::error::{SignplateError, SignplateResult};

/// Measurement capability used by the text fitter.
///
/// Implementations report the rendered advance width of `text` in pixels under a font that is
/// fixed for the implementation's lifetime. The empty string measures `0.0`.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn measure(&mut self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: FnMut(&str) -> f32,
{
    fn measure(&mut self, text: &str) -> f32 {
        self(text)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<ColorDef> for TextBrushRgba8 {
    fn from(c: ColorDef) -> Self {
        let [r, g, b, a] = c.to_rgba8();
        Self { r, g, b, a }
    }
}

/// A single shaped caption line.
pub(crate) struct ShapedLine {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    /// Advance width in pixels.
    pub(crate) width: f32,
    /// Distance from the layout top to the first baseline.
    pub(crate) baseline: f32,
}

/// Parley-backed shaper bound to one font file, size and colour.
///
/// Binding the font at construction means every measurement is valid without any prior setup.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    size_px: f32,
    brush: TextBrushRgba8,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("family", &self.family)
            .field("size_px", &self.size_px)
            .field("brush", &self.brush)
            .finish_non_exhaustive()
    }
}

impl TextShaper {
    /// Register `font_bytes` and bind the shaper to them.
    pub fn from_font_bytes(
        font_bytes: Vec<u8>,
        size_px: f32,
        color: ColorDef,
    ) -> SignplateResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SignplateError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SignplateError::decode("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SignplateError::decode("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            size_px,
            brush: color.into(),
            font,
        })
    }

    /// Read the configured font file and bind the shaper to it.
    pub fn from_settings(text: &TextSettings) -> SignplateResult<Self> {
        let bytes = std::fs::read(&text.font_source)
            .with_context(|| format!("read font '{}'", text.font_source.display()))?;
        let shaper = Self::from_font_bytes(bytes, text.font.size_px, text.color)?;
        if !shaper.family.eq_ignore_ascii_case(&text.font.family) {
            tracing::warn!(
                requested = %text.font.family,
                registered = %shaper.family,
                "font family differs from the font file; using the file's family"
            );
        }
        Ok(shaper)
    }

    /// Family name registered from the font file.
    pub fn family_name(&self) -> &str {
        &self.family
    }

    /// Font size in pixels.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` as a single unwrapped line.
    pub(crate) fn shape_line(&mut self, text: &str) -> ShapedLine {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(self.brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(0.0);
        // Trailing whitespace advances the pen, so it counts toward the caption width.
        let width = if text.is_empty() {
            0.0
        } else {
            layout.full_width()
        };

        ShapedLine {
            layout,
            width,
            baseline,
        }
    }
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str) -> f32 {
        self.shape_line(text).width
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
