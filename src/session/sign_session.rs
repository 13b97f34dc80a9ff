use crate::assets::SourceImage;
use crate::assets::load::ImageLoad;
use crate::config::settings::{Settings, SettingsDef};
use crate::foundation::error::{SignplateError, SignplateResult};
use crate::render::compositor::Compositor;
use crate::session::presentation::Presentation;

/// What a single input event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The source image is still loading; nothing was drawn or published.
    ImageNotReady,
    /// The fitted caption was empty; the download reference was cleared.
    Cleared,
    /// A composite was published to the preview and download.
    Published {
        /// Caption after fitting.
        caption: String,
        /// Content hash of the published artifact.
        fingerprint: u64,
    },
}

struct Ready {
    image: SourceImage,
    settings: Settings,
    compositor: Compositor,
}

/// Input-driven captioning session.
///
/// Each [`SignSession::handle_input`] call is one input-change event. Settings and the compositor
/// are built once, on the first event after the image load completes, from the image's natural
/// size; they are never rebuilt.
pub struct SignSession {
    def: SettingsDef,
    load: ImageLoad,
    ready: Option<Ready>,
    setup_error: Option<SignplateError>,
}

impl std::fmt::Debug for SignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignSession")
            .field("load", &self.load)
            .field("ready", &self.ready.is_some())
            .field("setup_error", &self.setup_error)
            .finish_non_exhaustive()
    }
}

impl SignSession {
    /// Create a session over a (possibly still pending) image load.
    pub fn new(load: ImageLoad, def: SettingsDef) -> Self {
        Self {
            def,
            load,
            ready: None,
            setup_error: None,
        }
    }

    /// Whether the image has loaded and the compositor is set up.
    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// Resolved settings, once the image has loaded.
    pub fn settings(&self) -> Option<&Settings> {
        self.ready.as_ref().map(|r| &r.settings)
    }

    /// Block until the image load finishes and set up the compositor.
    pub fn wait_for_image(&mut self) -> SignplateResult<()> {
        self.load.block();
        self.ensure_ready().map(|_| ())
    }

    /// Handle one input-change event carrying the current caption `text`.
    ///
    /// - Image not loaded yet: nothing happens, no sink is touched.
    /// - Fitted caption empty: the download reference is cleared, the preview is untouched.
    /// - Otherwise: the composite is published to both preview and download.
    pub fn handle_input(
        &mut self,
        text: &str,
        sinks: &mut dyn Presentation,
    ) -> SignplateResult<InputOutcome> {
        let Some(ready) = self.ensure_ready()? else {
            tracing::debug!("source image not loaded yet; input ignored");
            return Ok(InputOutcome::ImageNotReady);
        };

        let caption = ready.compositor.fit(text);
        if caption.is_empty() {
            sinks.clear_download()?;
            tracing::debug!("empty caption; download cleared");
            return Ok(InputOutcome::Cleared);
        }

        let artifact = ready.compositor.compose(&ready.image, &caption)?;
        sinks.set_preview(&artifact)?;
        sinks.set_download(&artifact)?;

        let fingerprint = artifact.fingerprint();
        tracing::info!(
            chars = caption.chars().count(),
            bytes = artifact.bytes().len(),
            fingerprint = format_args!("{fingerprint:016x}"),
            "composite published"
        );
        Ok(InputOutcome::Published {
            caption,
            fingerprint,
        })
    }

    fn ensure_ready(&mut self) -> SignplateResult<Option<&mut Ready>> {
        if let Some(err) = &self.setup_error {
            return Err(replay_setup_error(err));
        }
        if self.ready.is_none() {
            let Some(res) = self.load.poll() else {
                return Ok(None);
            };
            match res.and_then(|image| Self::build_ready(&self.def, image)) {
                Ok(ready) => self.ready = Some(ready),
                Err(e) => {
                    let replay = replay_setup_error(&e);
                    self.setup_error = Some(e);
                    return Err(replay);
                }
            }
        }
        Ok(self.ready.as_mut())
    }

    fn build_ready(def: &SettingsDef, image: SourceImage) -> SignplateResult<Ready> {
        let settings = Settings::for_image(def, &image)?;
        let compositor = Compositor::from_settings(&settings)?;
        tracing::info!(
            width = settings.image.width,
            height = settings.image.height,
            font = %settings.text.font,
            family = compositor.shaper().family_name(),
            format = settings.image.format.mime(),
            "session ready"
        );
        Ok(Ready {
            image,
            settings,
            compositor,
        })
    }
}

/// Rebuild a stored setup failure, keeping its kind and message.
fn replay_setup_error(err: &SignplateError) -> SignplateError {
    match err {
        SignplateError::Validation(msg) => SignplateError::Validation(msg.clone()),
        SignplateError::Decode(msg) => SignplateError::Decode(msg.clone()),
        SignplateError::Render(msg) => SignplateError::Render(msg.clone()),
        SignplateError::Encode(msg) => SignplateError::Encode(msg.clone()),
        SignplateError::Other(e) => SignplateError::Other(anyhow::anyhow!("{e:#}")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sign_session.rs"]
mod tests;
