use std::sync::Arc;
use std::time::Instant;

use crate::assets::SourceImage;
use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::config::settings::{OutputFormat, Settings};
use crate::encode::{EncodedImage, encode_rgba8};
use crate::foundation::error::{SignplateError, SignplateResult};
use crate::text::fit::fit_text;
use crate::text::shaper::{TextMeasure, TextShaper};

/// Straight-alpha RGBA8 pixels read back from the drawing surface.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, straight alpha.
    pub data: Vec<u8>,
}

/// Draws a source image plus caption onto a fixed-size surface and encodes the result.
///
/// The compositor exclusively owns the drawing surface. Every call clears and fully repaints it,
/// so the output depends only on (image, caption, settings).
pub struct Compositor {
    width: u32,
    height: u32,
    padding: f32,
    format: OutputFormat,
    shaper: TextShaper,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("padding", &self.padding)
            .field("format", &self.format)
            .field("shaper", &self.shaper)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Allocate a surface sized from `settings` and bind it to `shaper`.
    pub fn new(settings: &Settings, shaper: TextShaper) -> SignplateResult<Self> {
        let (w, h) = surface_dims(settings.image.width, settings.image.height)?;
        Ok(Self {
            width: settings.image.width,
            height: settings.image.height,
            padding: settings.image.padding,
            format: settings.image.format,
            shaper,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Like [`Compositor::new`], reading the font named in `settings`.
    pub fn from_settings(settings: &Settings) -> SignplateResult<Self> {
        let shaper = TextShaper::from_settings(&settings.text)?;
        Self::new(settings, shaper)
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The shaper used for both measuring and painting.
    pub fn shaper(&self) -> &TextShaper {
        &self.shaper
    }

    /// Measured caption width with the painting font.
    pub fn measure(&mut self, text: &str) -> f32 {
        self.shaper.measure(text)
    }

    /// Fit `text` to the surface width minus padding on both sides.
    pub fn fit(&mut self, text: &str) -> String {
        fit_text(&mut self.shaper, text, self.width as f32, self.padding)
    }

    /// Composite `image` and `text` and encode the surface in the configured format.
    #[tracing::instrument(skip(self, image, text), fields(chars = text.chars().count()))]
    pub fn compose(&mut self, image: &SourceImage, text: &str) -> SignplateResult<EncodedImage> {
        let start = Instant::now();
        let frame = self.render(image, text)?;
        let encoded = encode_rgba8(&frame.data, frame.width, frame.height, self.format)?;
        tracing::debug!(
            bytes = encoded.bytes().len(),
            fingerprint = format_args!("{:016x}", encoded.fingerprint()),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "composite encoded"
        );
        Ok(encoded)
    }

    /// Composite `image` and `text` and read the surface back without encoding.
    pub fn render(&mut self, image: &SourceImage, text: &str) -> SignplateResult<FrameRGBA> {
        let paint = image_paint(image)?;

        self.ctx.reset();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Stretch to the surface; aspect ratio is not preserved.
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(
            f64::from(self.width) / iw,
            f64::from(self.height) / ih,
        ));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));

        if !text.is_empty() {
            self.draw_caption(text);
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data,
        })
    }

    fn draw_caption(&mut self, text: &str) {
        let line = self.shaper.shape_line(text);
        let anchor = caption_anchor(
            f64::from(self.width),
            f64::from(self.height),
            f64::from(line.width),
            f64::from(self.padding),
        );
        // Glyph y positions are relative to the layout top; shift so the first baseline lands on
        // the anchor.
        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            anchor.x,
            anchor.y - f64::from(line.baseline),
        )));

        for layout_line in line.layout.lines() {
            for item in layout_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(self.shaper.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

/// Caption anchor: right-aligned `padding` from the right edge, baseline `padding` above the
/// bottom edge.
pub fn caption_anchor(width: f64, height: f64, text_width: f64, padding: f64) -> kurbo::Point {
    kurbo::Point::new(width - text_width - padding, height - padding)
}

fn surface_dims(width: u32, height: u32) -> SignplateResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SignplateError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SignplateError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(SignplateError::render("surface must be at least 1x1"));
    }
    Ok((w, h))
}

fn image_paint(image: &SourceImage) -> SignplateResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(image.rgba8_premul(), image.width(), image.height())?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SignplateResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SignplateError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
