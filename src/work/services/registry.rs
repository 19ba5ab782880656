//! The work registry: creation, lookup, and mutation of units of work.

use mockable::Clock;
use std::sync::Arc;
use tracing::info;

use super::{WorkError, WorkResult, WorkStep};
use crate::work::{
    domain::{IssueReference, NewWorkUnit, WorkKey, WorkUnit},
    ports::WorkRecordStore,
};

/// Durable source of truth for units of work.
#[derive(Clone)]
pub struct WorkRegistry<S, C>
where
    S: WorkRecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> WorkRegistry<S, C>
where
    S: WorkRecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a registry over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Looks up a unit of work by exact key.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::Registry`] when the store fails.
    pub async fn find(&self, key: &WorkKey) -> WorkResult<Option<WorkUnit>> {
        self.store
            .get(key)
            .await
            .map_err(|err| WorkError::registry(key.clone(), WorkStep::LoadWork, err))
    }

    /// Returns the unit of work stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::WorkNotFound`] for an unknown key.
    pub async fn require_data(&self, key: &WorkKey) -> WorkResult<WorkUnit> {
        self.find(key)
            .await?
            .ok_or_else(|| WorkError::WorkNotFound(key.clone()))
    }

    /// Builds and validates a unit of work without storing it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::Domain`] for invalid input and
    /// [`WorkError::DuplicateWork`] when the derived key is taken.
    pub async fn prepare(&self, new_unit: NewWorkUnit) -> WorkResult<WorkUnit> {
        let unit = WorkUnit::start(new_unit, &*self.clock)?;
        self.ensure_vacant(unit.key()).await?;
        Ok(unit)
    }

    /// Stores a prepared unit of work, re-checking that its key is free.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::DuplicateWork`] when the key is taken, or
    /// [`WorkError::Registry`] when the store fails.
    pub async fn commit(&self, unit: &WorkUnit) -> WorkResult<()> {
        self.ensure_vacant(unit.key()).await?;
        info!(work_key = %unit.key(), projects = unit.projects().len(), "persisting work");
        self.put(unit).await
    }

    /// Creates and stores a new unit of work.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`] and [`Self::commit`].
    pub async fn start_work(&self, new_unit: NewWorkUnit) -> WorkResult<WorkUnit> {
        let unit = self.prepare(new_unit).await?;
        self.commit(&unit).await?;
        Ok(unit)
    }

    /// Adds issues to an existing unit of work and stores the result.
    ///
    /// Returns the updated unit and the issues that were new.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::WorkNotFound`] for an unknown key and
    /// [`WorkError::Domain`] for issues outside the bound projects.
    pub async fn add_issues(
        &self,
        key: &WorkKey,
        issues: Vec<IssueReference>,
    ) -> WorkResult<(WorkUnit, Vec<IssueReference>)> {
        let mut unit = self.require_data(key).await?;
        let added = unit.add_issues(issues, &*self.clock)?;
        if !added.is_empty() {
            info!(work_key = %key, added = added.len(), "persisting added issues");
            self.put(&unit).await?;
        }
        Ok((unit, added))
    }

    async fn ensure_vacant(&self, key: &WorkKey) -> WorkResult<()> {
        if self.find(key).await?.is_some() {
            return Err(WorkError::DuplicateWork(key.clone()));
        }
        Ok(())
    }

    async fn put(&self, unit: &WorkUnit) -> WorkResult<()> {
        self.store
            .put(unit.key(), unit)
            .await
            .map_err(|err| WorkError::registry(unit.key().clone(), WorkStep::PersistWork, err))
    }
}
