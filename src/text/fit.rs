use crate::config::settings::Settings;
use crate::text::shaper::TextMeasure;

/// Truncate `text` from the end until its measured width fits `max_width - 2 * padding`.
///
/// One trailing `char` is removed per step, with no ellipsis and no word-boundary awareness.
/// The result is always a prefix of `text`: unchanged if it already fits, possibly empty if
/// nothing does.
pub fn fit_text<M>(measure: &mut M, text: &str, max_width: f32, padding: f32) -> String
where
    M: TextMeasure + ?Sized,
{
    let budget = max_width - padding * 2.0;
    let mut fitted = text.to_owned();
    let mut width = measure.measure(&fitted);

    // Bounded by the char count of `text`.
    while width > budget && fitted.pop().is_some() {
        width = measure.measure(&fitted);
    }

    if fitted.len() != text.len() {
        tracing::debug!(
            original_chars = text.chars().count(),
            fitted_chars = fitted.chars().count(),
            width,
            budget,
            "caption truncated"
        );
    }
    fitted
}

/// [`fit_text`] with the surface width and padding taken from `settings`.
pub fn fit_for_settings<M>(measure: &mut M, text: &str, settings: &Settings) -> String
where
    M: TextMeasure + ?Sized,
{
    fit_text(
        measure,
        text,
        settings.image.width as f32,
        settings.image.padding,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;
