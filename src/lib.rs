//! signplate stamps a caption onto an image and exports the composite.
//!
//! The pipeline for one input event:
//!
//! 1. **Fit**: `caption -> prefix` that fits `width - 2 * padding` ([`fit_text`])
//! 2. **Composite**: clear, stretch the source image over the surface, draw the caption
//!    right-aligned above the bottom edge ([`Compositor`])
//! 3. **Encode**: JPEG or PNG bytes, optionally as a `data:` URI ([`EncodedImage`])
//! 4. **Publish**: preview and download sinks ([`Presentation`])
//!
//! [`SignSession`] wires these together behind two guards: nothing
//! happens until the image has loaded, and an empty caption clears the download.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same image, caption and settings always produce the same bytes.
//! - **Explicit measurement**: the fitter takes a [`TextMeasure`] instead of ambient font state.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod encode;
mod foundation;
mod render;
mod session;
mod text;

pub use crate::assets::SourceImage;
pub use crate::assets::color::ColorDef;
pub use crate::assets::decode::{decode_image, decode_svg};
pub use crate::assets::load::{ImageLoad, load_source_image};
pub use crate::config::settings::{
    DEFAULT_JPEG_QUALITY, DEFAULT_PADDING_PX, FontDescriptor, ImageSettings, ImageSettingsDef,
    OutputFormat, Settings, SettingsDef, TextSettings, TextSettingsDef,
};
pub use crate::encode::EncodedImage;
pub use crate::foundation::error::{SignplateError, SignplateResult};
pub use crate::render::compositor::{Compositor, FrameRGBA, caption_anchor};
pub use crate::session::presentation::{FilePresentation, InMemoryPresentation, Presentation};
pub use crate::session::sign_session::{InputOutcome, SignSession};
pub use crate::text::fit::{fit_for_settings, fit_text};
pub use crate::text::shaper::{TextMeasure, TextShaper};
