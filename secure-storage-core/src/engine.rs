//! Storage engine: the six logical operations over a platform store.

use std::collections::HashMap;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::accessibility::AccessConstraint;
use crate::backend::SecureAttributeStore;
use crate::config::StorageConfig;
use crate::error::{SecureStorageError, StorageResult};
use crate::lock::{ItemIdentity, ItemLocks};
use crate::query::{base_query, scope_query, ItemAttributes, MatchLimit, Protection};
use crate::request::SecureStorageRequest;
use crate::status::ItemStatus;

/// Backend status of an operation together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageResponse<T> {
    /// Status reported by the backend.
    pub status: ItemStatus,
    /// Value produced by the operation.
    pub value: T,
}

/// Secure key-value storage on top of a [`SecureAttributeStore`].
///
/// The engine keeps no item state of its own; everything lives in the store.
/// Caller mistakes (missing `key`) are errors, backend outcomes are returned
/// as [`ItemStatus`] values.
pub struct SecureStorage {
    store: Arc<dyn SecureAttributeStore>,
    locks: ItemLocks,
    config: StorageConfig,
}

impl std::fmt::Debug for SecureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SecureStorage {
    /// Creates an engine over `store` with the default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn SecureAttributeStore>) -> Self {
        Self::with_config(store, StorageConfig::default())
    }

    /// Creates an engine over `store` with an explicit configuration.
    #[must_use]
    pub fn with_config(store: Arc<dyn SecureAttributeStore>, config: StorageConfig) -> Self {
        Self {
            store,
            locks: ItemLocks::new(),
            config,
        }
    }

    /// Returns whether a readable value exists for the request's key.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStorageError::MissingArguments`] if `key` is absent or empty.
    pub fn contains_key(&self, request: &SecureStorageRequest) -> StorageResult<bool> {
        require_key(request, "containsKey")?;
        Ok(self.read_item(request).value.is_some())
    }

    /// Reads the value stored under the request's key.
    ///
    /// A payload that is not valid UTF-8 reads as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStorageError::MissingArguments`] if `key` is absent or empty.
    pub fn read(
        &self,
        request: &SecureStorageRequest,
    ) -> StorageResult<StorageResponse<Option<String>>> {
        require_key(request, "read")?;
        Ok(self.read_item(request))
    }

    /// Reads every item in the request's scope, keyed by account.
    ///
    /// Backend failures and empty scopes both yield an empty map; the status
    /// tells them apart.
    #[must_use]
    pub fn read_all(
        &self,
        request: &SecureStorageRequest,
    ) -> StorageResponse<HashMap<String, String>> {
        let mut query = base_query(request, Some(true));
        query.match_limit = Some(MatchLimit::All);
        query.return_attributes = Some(true);

        let result = self.store.copy_matching(query);
        let mut values = HashMap::new();
        if result.status.is_success() {
            for item in result.items {
                let Some(account) = item.account else {
                    log::warn!("readAll skipped an item without an account attribute");
                    continue;
                };
                values.insert(account, item.data.map(decode_lossy).unwrap_or_default());
            }
        }
        log::debug!("readAll status={:?} items={}", result.status, values.len());

        StorageResponse {
            status: result.status,
            value: values,
        }
    }

    /// Deletes the item stored under the request's key.
    ///
    /// A missing item yields [`ItemStatus::ItemNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`SecureStorageError::MissingArguments`] if `key` is absent or
    /// empty.
    pub fn delete(&self, request: &SecureStorageRequest) -> StorageResult<ItemStatus> {
        require_key(request, "delete")?;
        let status = self.serialized(request, || self.store.delete(base_query(request, None)));
        log::debug!("delete status={status:?}");
        Ok(status)
    }

    /// Deletes every item in the given scope.
    ///
    /// Destructive: with no scope at all this removes every item reachable
    /// under the caller's default scope.
    #[must_use]
    pub fn delete_all(
        &self,
        group_id: Option<&str>,
        account_name: Option<&str>,
        synchronizable: Option<bool>,
    ) -> ItemStatus {
        if group_id.is_none() && account_name.is_none() {
            log::warn!("deleteAll without group or account removes the whole default scope");
        }
        let status = self
            .store
            .delete(scope_query(group_id, account_name, synchronizable));
        log::debug!("deleteAll status={status:?}");
        status
    }

    /// Writes the request's value under its key, updating an existing item
    /// or inserting a new one.
    ///
    /// Returns [`ItemStatus::InvalidParameter`] without touching the store
    /// when the request carries no value.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStorageError::MissingArguments`] if `key` is absent or
    /// empty.
    pub fn write(&self, request: &SecureStorageRequest) -> StorageResult<ItemStatus> {
        require_key(request, "write")?;
        let Some(payload) = request.value_bytes() else {
            return Ok(ItemStatus::InvalidParameter);
        };

        let protection = self.resolve_protection(request);
        let status = self.serialized(request, || self.write_item(request, payload, protection));
        log::debug!("write status={status:?}");
        Ok(status)
    }

    /// Resolves the protection of a written item. An access-control
    /// descriptor the store cannot build degrades to the plain tier.
    fn resolve_protection(&self, request: &SecureStorageRequest) -> Protection {
        let tier = request.accessibility().tier();
        if !request.use_access_control() {
            return Protection::Tier(tier);
        }
        match self
            .store
            .create_access_control(tier, AccessConstraint::UserPresence)
        {
            Ok(control) => Protection::AccessControl(control),
            Err(err) => {
                log::warn!(
                    "user presence unavailable ({err}), protecting item with {tier:?} only"
                );
                Protection::Tier(tier)
            }
        }
    }

    fn write_item(
        &self,
        request: &SecureStorageRequest,
        payload: &[u8],
        protection: Protection,
    ) -> ItemStatus {
        let exists = self.read_item(request).value.is_some();
        let query = base_query(request, None);
        let mut attributes = ItemAttributes::new(payload.to_vec(), protection);

        if exists {
            attributes.synchronizable = Some(request.synchronizable().unwrap_or(false));
            self.store.update(query, attributes)
        } else {
            self.store.add(query, attributes)
        }
    }

    fn read_item(&self, request: &SecureStorageRequest) -> StorageResponse<Option<String>> {
        let result = self.store.copy_matching(base_query(request, Some(true)));
        let value = if result.status.is_success() {
            result
                .items
                .into_iter()
                .next()
                .and_then(|item| item.data)
                .map(decode_lossy)
        } else {
            None
        };
        log::debug!("read status={:?} found={}", result.status, value.is_some());

        StorageResponse {
            status: result.status,
            value,
        }
    }

    fn serialized<R>(&self, request: &SecureStorageRequest, f: impl FnOnce() -> R) -> R {
        if self.config.serialize_writes {
            self.locks.with_item_lock(&ItemIdentity::from(request), f)
        } else {
            f()
        }
    }
}

fn require_key<'a>(
    request: &'a SecureStorageRequest,
    operation: &str,
) -> StorageResult<&'a str> {
    request.required_key().ok_or_else(|| {
        SecureStorageError::missing(format!("`{operation}` requires key parameter"))
    })
}

fn decode_lossy(data: Vec<u8>) -> String {
    let data = Zeroizing::new(data);
    std::str::from_utf8(&data).map_or_else(
        |err| {
            log::warn!("stored value is not valid UTF-8 ({err}), reading it as empty");
            String::new()
        },
        str::to_owned,
    )
}
