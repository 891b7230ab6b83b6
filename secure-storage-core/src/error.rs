//! Error types for secure storage requests.

use thiserror::Error;

/// Result type for secure storage operations.
pub type StorageResult<T> = Result<T, SecureStorageError>;

/// Errors raised before or around a backend call.
///
/// Backend outcomes such as "item not found" are not errors; they are
/// reported as [`crate::ItemStatus`] values.
#[derive(Debug, Error, uniffi::Error)]
pub enum SecureStorageError {
    /// The argument bag or one of its options could not be parsed.
    #[error("invalidArguments:{0}")]
    InvalidArguments(String),

    /// A required argument (the bag, its `options`, `key` or `value`) is absent.
    #[error("missingArguments:{0}")]
    MissingArguments(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl SecureStorageError {
    /// Short error code reported across the host boundary.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "-101",
            Self::MissingArguments(_) => "-102",
            Self::UnexpectedUniFFICallbackError(_) => "-999",
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    pub(crate) fn missing(message: impl Into<String>) -> Self {
        Self::MissingArguments(message.into())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SecureStorageError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}
