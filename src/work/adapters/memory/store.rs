//! In-memory work record store for registry tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::work::{
    domain::{WorkKey, WorkUnit},
    ports::{WorkRecordStore, WorkRecordStoreError, WorkRecordStoreResult},
};

/// Thread-safe in-memory work record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkRecordStore {
    records: Arc<RwLock<HashMap<WorkKey, WorkUnit>>>,
}

impl InMemoryWorkRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn len(&self) -> WorkRecordStoreResult<usize> {
        let records = self.records.read().map_err(|err| {
            WorkRecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(records.len())
    }

    /// Returns `true` when no records are stored.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn is_empty(&self) -> WorkRecordStoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl WorkRecordStore for InMemoryWorkRecordStore {
    async fn get(&self, key: &WorkKey) -> WorkRecordStoreResult<Option<WorkUnit>> {
        let records = self.records.read().map_err(|err| {
            WorkRecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(records.get(key).cloned())
    }

    async fn put(&self, key: &WorkKey, unit: &WorkUnit) -> WorkRecordStoreResult<()> {
        let mut records = self.records.write().map_err(|err| {
            WorkRecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        records.insert(key.clone(), unit.clone());
        Ok(())
    }
}
