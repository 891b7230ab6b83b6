//! Per-item locks serializing mutations of the same logical item.
//!
//! `write` probes for an existing item before choosing between insert and
//! update. Two writers racing on the same item inside one process would
//! otherwise both see "missing" and one of them would hit a duplicate-item
//! status. Holding the item's lock across probe and mutation closes that
//! window. Distinct items never contend.
//!
//! The lock only covers this process; other processes sharing the platform
//! store still rely on the store's own uniqueness checks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::request::SecureStorageRequest;

/// Logical identity of a stored item: `(key, group, account, synchronizable)`.
///
/// An unspecified `synchronizable` is the platform default, `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemIdentity {
    key: Option<String>,
    group_id: Option<String>,
    account_name: Option<String>,
    synchronizable: bool,
}

impl From<&SecureStorageRequest> for ItemIdentity {
    fn from(request: &SecureStorageRequest) -> Self {
        Self {
            key: request.key().map(str::to_owned),
            group_id: request.group_id().map(str::to_owned),
            account_name: request.account_name().map(str::to_owned),
            synchronizable: request.synchronizable().unwrap_or(false),
        }
    }
}

/// Registry of in-process item locks.
#[derive(Debug, Default)]
pub struct ItemLocks {
    slots: Mutex<HashMap<ItemIdentity, Arc<Mutex<()>>>>,
}

impl ItemLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `identity`.
    ///
    /// The locks guard no data, so a panic inside `f` neither poisons the
    /// item nor leaks its registry entry.
    #[must_use]
    pub fn with_item_lock<R>(&self, identity: &ItemIdentity, f: impl FnOnce() -> R) -> R {
        let slot = Slot::acquire(self, identity);
        let _held = slot.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of identities currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<ItemIdentity, Arc<Mutex<()>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A caller's claim on an item lock. Dropping it prunes the registry entry
/// once no other caller holds or waits on it, including on unwind.
struct Slot<'a> {
    locks: &'a ItemLocks,
    identity: &'a ItemIdentity,
    mutex: Arc<Mutex<()>>,
}

impl<'a> Slot<'a> {
    fn acquire(locks: &'a ItemLocks, identity: &'a ItemIdentity) -> Self {
        let mutex = Arc::clone(locks.registry().entry(identity.clone()).or_default());
        Self {
            locks,
            identity,
            mutex,
        }
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        let mut slots = self.locks.registry();
        // One reference lives in the registry, the other in this slot.
        if slots
            .get(self.identity)
            .is_some_and(|entry| Arc::strong_count(entry) == 2)
        {
            slots.remove(self.identity);
        }
    }
}
