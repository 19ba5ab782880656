//! Persistence port for the work registry.

use crate::work::domain::{WorkKey, WorkUnit};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for work record store operations.
pub type WorkRecordStoreResult<T> = Result<T, WorkRecordStoreError>;

/// Keyed record store backing the work registry.
///
/// `put` overwrites; reads reflect the latest write for a key. Uniqueness of
/// keys is enforced by the registry, not the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkRecordStore: Send + Sync {
    /// Returns the unit stored under `key`.
    async fn get(&self, key: &WorkKey) -> WorkRecordStoreResult<Option<WorkUnit>>;

    /// Stores `unit` under `key`, replacing any previous record.
    async fn put(&self, key: &WorkKey, unit: &WorkUnit) -> WorkRecordStoreResult<()>;
}

/// Errors returned by work record stores.
#[derive(Debug, Clone, Error)]
pub enum WorkRecordStoreError {
    /// The stored data could not be decoded.
    #[error("corrupt work registry data: {0}")]
    Corrupt(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkRecordStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
