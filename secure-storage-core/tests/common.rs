//! Common test utilities shared across integration tests.

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]
#![allow(missing_docs, reason = "test helpers; also compiled as a standalone test target")]

use std::sync::{Arc, Mutex};

use secure_storage_core::{
    AccessConstraint, AccessControl, AccessControlError, AccessibilityTier, CopyMatchingResult,
    ItemAttributes, ItemQuery, ItemStatus, MemoryAttributeStore, SecureAttributeStore,
    SecureStorage,
};

/// A backend call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CopyMatching(ItemQuery),
    Add(ItemQuery, ItemAttributes),
    Update(ItemQuery, ItemAttributes),
    Delete(ItemQuery),
    CreateAccessControl(AccessibilityTier),
}

/// Records every call before forwarding it to an in-memory store.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryAttributeStore,
    calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl SecureAttributeStore for RecordingStore {
    fn copy_matching(&self, query: ItemQuery) -> CopyMatchingResult {
        self.record(Call::CopyMatching(query.clone()));
        self.inner.copy_matching(query)
    }

    fn add(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus {
        self.record(Call::Add(query.clone(), attributes.clone()));
        self.inner.add(query, attributes)
    }

    fn update(&self, query: ItemQuery, attributes: ItemAttributes) -> ItemStatus {
        self.record(Call::Update(query.clone(), attributes.clone()));
        self.inner.update(query, attributes)
    }

    fn delete(&self, query: ItemQuery) -> ItemStatus {
        self.record(Call::Delete(query.clone()));
        self.inner.delete(query)
    }

    fn create_access_control(
        &self,
        accessible: AccessibilityTier,
        constraint: AccessConstraint,
    ) -> Result<AccessControl, AccessControlError> {
        self.record(Call::CreateAccessControl(accessible));
        self.inner.create_access_control(accessible, constraint)
    }
}

pub fn recording_storage() -> (Arc<RecordingStore>, SecureStorage) {
    let store = Arc::new(RecordingStore::default());
    let storage = SecureStorage::new(store.clone());
    (store, storage)
}

pub fn memory_storage() -> (Arc<MemoryAttributeStore>, Arc<SecureStorage>) {
    let store = Arc::new(MemoryAttributeStore::new());
    let storage = Arc::new(SecureStorage::new(store.clone()));
    (store, storage)
}
