//! Host-facing entry point.
//!
//! Each method receives the JSON argument bag of one host call, checks the
//! caller preconditions, runs the engine operation and returns the value the
//! host expects back.

use std::collections::HashMap;
use std::sync::Arc;

use secure_storage_core::{
    SecureAttributeStore, SecureStorage, SecureStorageError, SecureStorageRequest,
    StorageConfig, StorageResult,
};

/// Secure storage exposed to Swift and Kotlin.
///
/// # Example (Swift)
///
/// ```swift
/// let storage = SecureStorageBridge(store: KeychainAttributeStore())
/// let status = try storage.write(arguments: #"{"key":"token","value":"s3cret","options":{}}"#)
/// let token = try storage.read(arguments: #"{"key":"token","options":{}}"#)
/// ```
#[derive(Debug, uniffi::Object)]
pub struct SecureStorageBridge {
    engine: SecureStorage,
}

#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
impl SecureStorageBridge {
    /// Creates a bridge over the platform store with the default configuration.
    #[uniffi::constructor]
    pub fn new(store: Arc<dyn SecureAttributeStore>) -> Self {
        Self {
            engine: SecureStorage::new(store),
        }
    }

    /// Creates a bridge over the platform store with an explicit configuration.
    #[uniffi::constructor]
    pub fn with_config(store: Arc<dyn SecureAttributeStore>, config: StorageConfig) -> Self {
        Self {
            engine: SecureStorage::with_config(store, config),
        }
    }

    /// Reads the value stored under `key`, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments or a missing `key`.
    pub fn read(&self, arguments: String) -> StorageResult<Option<String>> {
        let request = parse(&arguments)?;
        Ok(self.engine.read(&request)?.value)
    }

    /// Writes `value` under `key` and returns the backend status code.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments or a missing `key` or `value`.
    pub fn write(&self, arguments: String) -> StorageResult<i32> {
        let request = parse(&arguments)?;
        if request.key().is_none() || request.value().is_none() {
            return Err(SecureStorageError::MissingArguments(
                "`write` requires key and value parameter".to_string(),
            ));
        }
        Ok(self.engine.write(&request)?.code())
    }

    /// Deletes the item stored under `key` and returns the backend status code.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments or a missing `key`.
    pub fn delete(&self, arguments: String) -> StorageResult<i32> {
        let request = parse(&arguments)?;
        Ok(self.engine.delete(&request)?.code())
    }

    /// Deletes every item in the `groupId` / `accountName` / `synchronizable`
    /// scope and returns the backend status code.
    ///
    /// Without a scope this clears everything the app can reach.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments.
    pub fn delete_all(&self, arguments: String) -> StorageResult<i32> {
        let request = parse(&arguments)?;
        let status = self.engine.delete_all(
            request.group_id(),
            request.account_name(),
            request.synchronizable(),
        );
        Ok(status.code())
    }

    /// Reads every item in scope as a key to value map.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments.
    pub fn read_all(&self, arguments: String) -> StorageResult<HashMap<String, String>> {
        let request = parse(&arguments)?;
        Ok(self.engine.read_all(&request).value)
    }

    /// Returns whether a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments or a missing `key`.
    pub fn contains_key(&self, arguments: String) -> StorageResult<bool> {
        let request = parse(&arguments)?;
        self.engine.contains_key(&request)
    }
}

fn parse(arguments: &str) -> StorageResult<SecureStorageRequest> {
    SecureStorageRequest::from_json(arguments).inspect_err(|err| {
        log::warn!("rejected host arguments: {err}");
    })
}
