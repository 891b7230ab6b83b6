//! Keychain-style secure key-value storage.
//!
//! Turns logical requests (key, value, scoping and protection options) into
//! queries against a platform [`SecureAttributeStore`], deciding between
//! insert and update and applying accessibility policy uniformly.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use secure_storage_core::{ItemStatus, MemoryAttributeStore, SecureStorage, SecureStorageRequest};
//!
//! let storage = SecureStorage::new(Arc::new(MemoryAttributeStore::new()));
//! let request = SecureStorageRequest::from_json(
//!     r#"{"key":"token","value":"s3cret","options":{"accessibility":"first_unlock"}}"#,
//! )?;
//! assert_eq!(storage.write(&request)?, ItemStatus::Success);
//! assert_eq!(storage.read(&request)?.value.as_deref(), Some("s3cret"));
//! # Ok::<(), secure_storage_core::SecureStorageError>(())
//! ```
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod accessibility;
pub use accessibility::*;

pub mod backend;
pub use backend::{
    AccessControlError, CopyMatchingResult, MatchedItem, MemoryAttributeStore,
    SecureAttributeStore,
};

mod config;
pub use config::*;

mod engine;
pub use engine::*;

mod error;
pub use error::*;

mod lock;
pub use lock::*;

/// Host log forwarding.
pub mod logger;

mod query;
pub use query::*;

mod request;
pub use request::*;

mod status;
pub use status::*;

uniffi::setup_scaffolding!("secure_storage_core");
