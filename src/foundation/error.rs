/// Convenience result type used across signplate.
pub type SignplateResult<T> = Result<T, SignplateError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SignplateError {
    /// Invalid user-provided settings or inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source image or font bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Drawing onto the surface failed.
    #[error("render error: {0}")]
    Render(String),

    /// Serializing the surface to an output format failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignplateError {
    /// Build a [`SignplateError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SignplateError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SignplateError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SignplateError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
