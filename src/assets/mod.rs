pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod load;
pub(crate) mod svg_raster;

use std::sync::Arc;

use crate::foundation::error::{SignplateError, SignplateResult};

/// Decoded source image in premultiplied RGBA8 form.
///
/// Cheap to clone; the pixel buffer is shared.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Build an image from straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> SignplateResult<Self> {
        if width == 0 || height == 0 {
            return Err(SignplateError::validation(
                "source image must have non-zero width and height",
            ));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba.len() != expected {
            return Err(SignplateError::validation(format!(
                "rgba buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        decode::premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixels.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}
