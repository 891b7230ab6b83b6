//! Secure key-value storage for mobile hosts.
//!
//! Re-exports the engine from `secure-storage-core` and adds
//! [`SecureStorageBridge`], which takes each host call's JSON argument bag and
//! returns plain values, status codes or a coded error.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod bridge;
pub use bridge::*;

pub use secure_storage_core::*;

uniffi::setup_scaffolding!("secure_storage");
