/// Convenience result type used across scenealign.
pub type AlignResult<T> = Result<T, AlignError>;

/// Top-level error taxonomy for a convergence run.
///
/// Only [`AlignError::Backend`] is recoverable: the controller logs it, skips the
/// affected source, and keeps iterating. Every other variant ends the run.
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    /// Missing credential, unreadable reference image, or invalid tunables.
    #[error("config error: {0}")]
    Config(String),

    /// The automation backend could not be reached or the handshake failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A capture returned no usable image data.
    #[error("capture error: {0}")]
    Capture(String),

    /// A scene or tracked source does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected an individual request.
    #[error("backend error: {0}")]
    Backend(String),

    /// Unexpected or malformed message on the automation wire protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid raster input (zero-sized images, undecodable bytes).
    #[error("image error: {0}")]
    Image(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AlignError {
    /// Build an [`AlignError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`AlignError::Connection`] value.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Build an [`AlignError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build an [`AlignError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build an [`AlignError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build an [`AlignError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build an [`AlignError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Whether the controller may skip the failing source and continue the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<tungstenite::Error> for AlignError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for AlignError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<image::ImageError> for AlignError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
