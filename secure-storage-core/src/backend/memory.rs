//! In-memory implementation of [`SecureAttributeStore`] for testing.
//!
//! NOT secure for production use: payloads sit in process memory in the
//! clear. It follows keychain matching rules closely enough to exercise the
//! engine end to end:
//!
//! - an item is identified by `(account, service, access group,
//!   synchronizable)` and `add` refuses duplicates;
//! - a query without `synchronizable` only sees non-synchronizable items;
//! - a query field left unset matches any stored value;
//! - `update` rejects search queries that carry return keys;
//! - a locked device hides items whose tier needs an unlocked device;
//! - items guarded by user presence are skipped under the skip-UI marker,
//!   pass with an authentication context, and otherwise depend on the
//!   simulated user's answer.

#![allow(clippy::significant_drop_tightening)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::accessibility::{AccessConstraint, AccessControl, AccessibilityTier};
use crate::query::{AuthenticationUi, ItemAttributes, ItemQuery, MatchLimit};
use crate::status::ItemStatus;

use super::{AccessControlError, CopyMatchingResult, MatchedItem, SecureAttributeStore};

/// An item held by [`MemoryAttributeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    /// Account attribute (the logical key).
    pub account: Option<String>,
    /// Service attribute (the account name option).
    pub service: Option<String>,
    /// Access group.
    pub access_group: Option<String>,
    /// Whether the item syncs across devices.
    pub synchronizable: bool,
    /// Payload.
    pub data: Vec<u8>,
    /// Accessibility tier.
    pub accessible: AccessibilityTier,
    /// Access-control descriptor, if any.
    pub access_control: Option<AccessControl>,
}

impl StoredItem {
    fn identity(&self) -> (Option<&str>, Option<&str>, Option<&str>, bool) {
        (
            self.account.as_deref(),
            self.service.as_deref(),
            self.access_group.as_deref(),
            self.synchronizable,
        )
    }

    fn matches(&self, query: &ItemQuery) -> bool {
        field_matches(self.account.as_ref(), query.account.as_ref())
            && field_matches(self.service.as_ref(), query.service.as_ref())
            && field_matches(self.access_group.as_ref(), query.access_group.as_ref())
            && self.synchronizable == query.synchronizable.unwrap_or(false)
    }

    /// Synchronized items cannot use a this-device-only tier.
    const fn syncs_device_only_tier(&self) -> bool {
        self.synchronizable && self.effective_tier().is_this_device_only()
    }

    const fn effective_tier(&self) -> AccessibilityTier {
        match self.access_control {
            Some(control) => control.accessible,
            None => self.accessible,
        }
    }

    fn apply(&mut self, attributes: &ItemAttributes) {
        if let Some(data) = &attributes.value_data {
            self.data.clone_from(data);
        }
        if let Some(synchronizable) = attributes.synchronizable {
            self.synchronizable = synchronizable;
        }
        if let Some(control) = attributes.access_control {
            self.accessible = control.accessible;
            self.access_control = Some(control);
        } else if let Some(tier) = attributes.accessible {
            self.accessible = tier;
            self.access_control = None;
        }
    }
}

fn field_matches(stored: Option<&String>, wanted: Option<&String>) -> bool {
    match wanted {
        Some(wanted) => stored == Some(wanted),
        None => true,
    }
}

enum Access {
    Granted,
    Skipped,
    Denied(ItemStatus),
}

/// In-memory secure attribute store.
///
/// Thread-safe; every operation takes the item lock once.
#[derive(Debug)]
pub struct MemoryAttributeStore {
    items: RwLock<Vec<StoredItem>>,
    device_locked: AtomicBool,
    presence_granted: AtomicBool,
    access_control_available: AtomicBool,
}

impl MemoryAttributeStore {
    /// Creates an empty, unlocked store whose simulated user approves every
    /// presence check.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            device_locked: AtomicBool::new(false),
            presence_granted: AtomicBool::new(true),
            access_control_available: AtomicBool::new(true),
        }
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of every stored item.
    #[must_use]
    pub fn items(&self) -> Vec<StoredItem> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Simulates the device being locked (after its first unlock).
    pub fn set_device_locked(&self, locked: bool) {
        self.device_locked.store(locked, Ordering::SeqCst);
    }

    /// Sets how the simulated user answers presence prompts.
    pub fn set_presence_granted(&self, granted: bool) {
        self.presence_granted.store(granted, Ordering::SeqCst);
    }

    /// Makes access-control descriptor creation succeed or fail.
    pub fn set_access_control_available(&self, available: bool) {
        self.access_control_available
            .store(available, Ordering::SeqCst);
    }

    fn check_access(&self, item: &StoredItem, query: &ItemQuery) -> Access {
        if self.device_locked.load(Ordering::SeqCst)
            && !item.effective_tier().is_available_while_locked()
        {
            return Access::Denied(ItemStatus::InteractionNotAllowed);
        }
        if item.access_control.is_none() || query.authentication_context.is_some() {
            return Access::Granted;
        }
        if query.authentication_ui == Some(AuthenticationUi::Skip) {
            return Access::Skipped;
        }
        if self.presence_granted.load(Ordering::SeqCst) {
            Access::Granted
        } else {
            Access::Denied(ItemStatus::UserCanceled)
        }
    }
}

impl Default for MemoryAttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureAttributeStore for MemoryAttributeStore {
    fn copy_matching(&self, query: ItemQuery) -> CopyMatchingResult {
        let limit = query.match_limit.unwrap_or(MatchLimit::One);
        let return_data = query.return_data == Some(true);
        let return_attributes = query.return_attributes == Some(true);

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched = Vec::new();
        for item in items.iter().filter(|item| item.matches(&query)) {
            match self.check_access(item, &query) {
                Access::Granted => matched.push(MatchedItem {
                    account: item.account.clone().filter(|_| return_attributes),
                    data: return_data.then(|| item.data.clone()),
                }),
                Access::Skipped => continue,
                Access::Denied(status) => return CopyMatchingResult::empty(status),
            }
            if limit == MatchLimit::One {
                break;
            }
        }

        if matched.is_empty() {
            CopyMatchingResult::empty(ItemStatus::ItemNotFound)
        } else {
            CopyMatchingResult {
                status: ItemStatus::Success,
                items: matched,
            }
        }
    }

    fn add(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus {
        let Some(data) = attributes.value_data else {
            return ItemStatus::InvalidParameter;
        };
        let access_control = attributes.access_control;
        let accessible = access_control.map_or_else(
            || attributes.accessible.unwrap_or(AccessibilityTier::WhenUnlocked),
            |control| control.accessible,
        );
        let synchronizable = attributes
            .synchronizable
            .or(query.synchronizable)
            .unwrap_or(false);
        let item = StoredItem {
            account: query.account,
            service: query.service,
            access_group: query.access_group,
            synchronizable,
            data,
            accessible,
            access_control,
        };

        if item.syncs_device_only_tier() {
            return ItemStatus::InvalidParameter;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items
            .iter()
            .any(|existing| existing.identity() == item.identity())
        {
            return ItemStatus::DuplicateItem;
        }
        items.push(item);
        ItemStatus::Success
    }

    fn update(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus {
        if query.has_return_keys() {
            return ItemStatus::InvalidParameter;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let (mut matched, rest): (Vec<StoredItem>, Vec<StoredItem>) =
            items.drain(..).partition(|item| item.matches(&query));
        if matched.is_empty() {
            *items = rest;
            return ItemStatus::ItemNotFound;
        }

        let original = matched.clone();
        for item in &mut matched {
            item.apply(&attributes);
        }
        if matched.iter().any(StoredItem::syncs_device_only_tier) {
            items.extend(original);
            items.extend(rest);
            return ItemStatus::InvalidParameter;
        }
        let collides = matched.iter().enumerate().any(|(index, item)| {
            rest.iter().any(|other| other.identity() == item.identity())
                || matched[..index]
                    .iter()
                    .any(|other| other.identity() == item.identity())
        });

        if collides {
            items.extend(original);
            items.extend(rest);
            return ItemStatus::DuplicateItem;
        }
        items.extend(rest);
        items.extend(matched);
        ItemStatus::Success
    }

    fn delete(&self, query: ItemQuery) -> ItemStatus {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|item| !item.matches(&query));
        if items.len() == before {
            ItemStatus::ItemNotFound
        } else {
            ItemStatus::Success
        }
    }

    fn create_access_control(
        &self,
        accessible: AccessibilityTier,
        constraint: AccessConstraint,
    ) -> Result<AccessControl, AccessControlError> {
        if self.access_control_available.load(Ordering::SeqCst) {
            Ok(AccessControl {
                accessible,
                constraint,
            })
        } else {
            Err(AccessControlError::Unavailable(format!(
                "{constraint:?} is not available for {accessible:?}"
            )))
        }
    }
}
