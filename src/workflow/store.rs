//! In-memory draft storage shared by request handlers.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AllocationDraft, Period};

/// Thread-safe map of saved allocation drafts keyed by id.
#[derive(Debug, Default)]
pub struct AllocationStore {
    drafts: RwLock<HashMap<Uuid, AllocationDraft>>,
}

impl AllocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the draft with the given id.
    pub fn get(&self, id: Uuid) -> EngineResult<AllocationDraft> {
        self.drafts
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::AllocationNotFound { id })
    }

    /// Stores a draft that already carries an id.
    pub fn insert(&self, id: Uuid, draft: AllocationDraft) {
        self.drafts.write().insert(id, draft);
    }

    /// Applies `change` to a stored draft while holding the write lock.
    ///
    /// The stored draft is only replaced when `change` succeeds.
    pub fn update<F>(&self, id: Uuid, change: F) -> EngineResult<AllocationDraft>
    where
        F: FnOnce(&mut AllocationDraft) -> EngineResult<()>,
    {
        let mut drafts = self.drafts.write();
        let stored = drafts
            .get_mut(&id)
            .ok_or(EngineError::AllocationNotFound { id })?;

        let mut working = stored.clone();
        change(&mut working)?;
        *stored = working.clone();
        Ok(working)
    }

    /// Returns the most recently saved draft for a period.
    pub fn latest_for_period(&self, period: Period) -> Option<AllocationDraft> {
        self.drafts
            .read()
            .values()
            .filter(|d| d.period == period)
            .max_by_key(|d| d.updated_at)
            .cloned()
    }

    /// Number of stored drafts.
    pub fn len(&self) -> usize {
        self.drafts.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.drafts.read().is_empty()
    }
}
