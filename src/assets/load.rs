use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::assets::SourceImage;
use crate::assets::decode::{decode_image, decode_svg};
use crate::foundation::error::{SignplateError, SignplateResult};

/// Read and decode a source image from disk.
///
/// Files with an `.svg` extension are rasterized at their intrinsic size; everything else goes
/// through the raster decoder with the format sniffed from content.
#[tracing::instrument]
pub fn load_source_image(path: &Path) -> SignplateResult<SourceImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read source image '{}'", path.display()))?;

    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    let image = if is_svg {
        decode_svg(&bytes, path.parent())?
    } else {
        decode_image(&bytes)?
    };
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        svg = is_svg,
        "source image decoded"
    );
    Ok(image)
}

enum LoadState {
    Pending(JoinHandle<SignplateResult<SourceImage>>),
    Finished(SignplateResult<SourceImage>),
    Taken,
}

/// Handle to a source image that may still be decoding.
///
/// The load runs on a background thread; callers check [`ImageLoad::is_complete`] (or
/// [`ImageLoad::poll`]) before compositing and never block the event loop on it.
pub struct ImageLoad {
    origin: Option<PathBuf>,
    state: LoadState,
}

impl std::fmt::Debug for ImageLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            LoadState::Pending(h) if h.is_finished() => "finished",
            LoadState::Pending(_) => "pending",
            LoadState::Finished(_) => "finished",
            LoadState::Taken => "taken",
        };
        f.debug_struct("ImageLoad")
            .field("origin", &self.origin)
            .field("state", &state)
            .finish()
    }
}

impl ImageLoad {
    /// Start decoding `path` on a background thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let worker_path = path.clone();
        let handle = std::thread::spawn(move || load_source_image(&worker_path));
        Self::from_handle(Some(path), handle)
    }

    pub(crate) fn from_handle(
        origin: Option<PathBuf>,
        handle: JoinHandle<SignplateResult<SourceImage>>,
    ) -> Self {
        Self {
            origin,
            state: LoadState::Pending(handle),
        }
    }

    /// Wrap an image that is already decoded.
    pub fn ready(image: SourceImage) -> Self {
        Self {
            origin: None,
            state: LoadState::Finished(Ok(image)),
        }
    }

    /// Path the image is being loaded from, if it came from disk.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Whether the load has finished (successfully or not). Never blocks.
    pub fn is_complete(&self) -> bool {
        match &self.state {
            LoadState::Pending(h) => h.is_finished(),
            LoadState::Finished(_) | LoadState::Taken => true,
        }
    }

    /// Take the load result if it is complete; `None` while still pending.
    ///
    /// The result is handed out once. Later calls return `None`.
    pub fn poll(&mut self) -> Option<SignplateResult<SourceImage>> {
        if !self.is_complete() {
            return None;
        }
        match std::mem::replace(&mut self.state, LoadState::Taken) {
            LoadState::Pending(h) => Some(join_load(h)),
            LoadState::Finished(res) => Some(res),
            LoadState::Taken => None,
        }
    }

    /// Block until the load finishes, keeping the result for a later [`ImageLoad::poll`].
    pub fn block(&mut self) {
        if let LoadState::Pending(_) = self.state
            && let LoadState::Pending(h) = std::mem::replace(&mut self.state, LoadState::Taken)
        {
            self.state = LoadState::Finished(join_load(h));
        }
    }

    /// Block until the load finishes and return its result.
    pub fn wait(mut self) -> SignplateResult<SourceImage> {
        match std::mem::replace(&mut self.state, LoadState::Taken) {
            LoadState::Pending(h) => join_load(h),
            LoadState::Finished(res) => res,
            LoadState::Taken => Err(SignplateError::validation(
                "image load result was already taken",
            )),
        }
    }
}

fn join_load(handle: JoinHandle<SignplateResult<SourceImage>>) -> SignplateResult<SourceImage> {
    handle
        .join()
        .map_err(|_| SignplateError::decode("image load thread panicked"))?
}

#[cfg(test)]
#[path = "../../tests/unit/assets/load.rs"]
mod tests;
