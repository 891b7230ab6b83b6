//! Platform secure attribute store interface.
//!
//! The engine never persists anything itself. Every item lives in a store
//! provided by the host:
//!
//! - iOS / macOS: Keychain Services (`SecItemCopyMatching`, `SecItemAdd`,
//!   `SecItemUpdate`, `SecItemDelete`, `SecAccessControlCreateWithFlags`)
//! - Android: Android Keystore backed preferences
//! - Tests: [`MemoryAttributeStore`]
//!
//! Implementations must be internally synchronized; the engine calls them
//! from whichever thread the host uses.

pub mod memory;

use thiserror::Error;

use crate::accessibility::{AccessConstraint, AccessControl, AccessibilityTier};
use crate::query::{ItemAttributes, ItemQuery};
use crate::status::ItemStatus;

pub use memory::MemoryAttributeStore;

/// One item returned by a search.
///
/// Fields are populated according to the query's return flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct MatchedItem {
    /// Account attribute, present when attributes were requested.
    pub account: Option<String>,
    /// Payload, present when data was requested.
    pub data: Option<Vec<u8>>,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CopyMatchingResult {
    /// Backend status of the search.
    pub status: ItemStatus,
    /// Matches, empty unless `status` is success.
    pub items: Vec<MatchedItem>,
}

impl CopyMatchingResult {
    /// A result without matches.
    #[must_use]
    pub const fn empty(status: ItemStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
        }
    }
}

/// Failure to create an access-control descriptor.
#[derive(Debug, Error, uniffi::Error)]
pub enum AccessControlError {
    /// The platform refused the requested combination.
    #[error("access control unavailable: {0}")]
    Unavailable(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for AccessControlError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// Keychain-style attribute store holding the secrets.
///
/// Status values are returned as data; only descriptor construction can fail
/// with an error.
#[uniffi::export(with_foreign)]
pub trait SecureAttributeStore: Send + Sync {
    /// Searches for items matching `query`.
    fn copy_matching(&self, query: ItemQuery) -> CopyMatchingResult;

    /// Inserts a new item identified by `query` carrying `attributes`.
    ///
    /// Must report [`ItemStatus::DuplicateItem`] if the identity is taken.
    fn add(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus;

    /// Updates every item matching `query` with `attributes`.
    fn update(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus;

    /// Deletes every item matching `query`.
    fn delete(&self, query: ItemQuery) -> ItemStatus;

    /// Creates an access-control descriptor for `accessible` guarded by
    /// `constraint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot build the descriptor.
    fn create_access_control(
        &self,
        accessible: AccessibilityTier,
        constraint: AccessConstraint,
    ) -> Result<AccessControl, AccessControlError>;
}
