/// Convenience result type used across Wavyte.
pub type WavyteResult<T> = Result<T, WavyteError>;

/// Top-level error taxonomy used by the filter pipeline.
#[derive(thiserror::Error, Debug)]
pub enum WavyteError {
    /// Invalid caller-provided data (descriptors, buffer sizes, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// Shader compilation or program link failure.
    #[error("shader compile error: {0}")]
    Compile(String),

    /// The GL interface reported an error or returned an invalid handle.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Misuse of a cached GPU resource.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WavyteError {
    /// Build a [`WavyteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WavyteError::Compile`] value.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// Build a [`WavyteError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`WavyteError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`WavyteError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
