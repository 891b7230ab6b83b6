//! Engine configuration supplied by the host.

/// Settings for a [`crate::SecureStorage`] engine.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct StorageConfig {
    /// Serialize `write` and `delete` per logical item inside this process.
    ///
    /// Turn off only when the host already serializes calls, e.g. a single
    /// platform thread dispatching every request.
    #[uniffi(default = true)]
    pub serialize_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            serialize_writes: true,
        }
    }
}
