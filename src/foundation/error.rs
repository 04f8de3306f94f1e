/// Convenience result type used across gifloom.
pub type GifResult<T> = Result<T, GifError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum GifError {
    /// Invalid caller-provided data (bad buffers, non-permutation reorders, bad settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame's source raster could not be loaded or decoded.
    #[error("source decode error: {0}")]
    SourceDecode(String),

    /// The container encoder was driven outside its `Empty -> Writing -> Finished` contract.
    #[error("encoder misuse: {0}")]
    EncoderMisuse(String),

    /// A generation step failed for a reason not attributable to a single source.
    #[error("generation error: {0}")]
    Generation(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifError {
    /// Build a [`GifError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GifError::SourceDecode`] value.
    pub fn source_decode(msg: impl Into<String>) -> Self {
        Self::SourceDecode(msg.into())
    }

    /// Build a [`GifError::EncoderMisuse`] value.
    pub fn encoder_misuse(msg: impl Into<String>) -> Self {
        Self::EncoderMisuse(msg.into())
    }

    /// Build a [`GifError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`GifError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
