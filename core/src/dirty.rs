//! Lazy, once-per-entity recomputation after a configuration commit.
//!
//! A commit only raises a flag. The first check afterwards expands the flag
//! into the concrete population at that moment; from then on each entity is
//! recomputed the next time its own check runs, and removed from the set.
//! Checks are piggy-backed on a host routine that already runs for every
//! entity on a regular cadence, so no scheduler is needed.

use std::collections::HashSet;

use splice_types::EntityId;

#[derive(Debug, Default, Clone)]
pub struct DirtyRecompute {
    pending_all: bool,
    dirty: HashSet<EntityId>,
}

impl DirtyRecompute {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare every current entity stale. O(1); nothing is materialized here.
    pub fn mark_all_dirty(&mut self) {
        if !self.pending_all {
            tracing::debug!("All entities marked dirty");
        }
        self.pending_all = true;
    }

    /// Recompute `entity` if it is stale, then mark it clean.
    ///
    /// `population` is only called when a commit is pending, to expand it
    /// into the dirty set (unioned with entries still unresolved from earlier
    /// commits). `recompute` runs at most once, and only for a stale entity.
    /// Returns whether it ran.
    pub fn check_and_clear<P, I, F>(&mut self, entity: EntityId, population: P, recompute: F) -> bool
    where
        P: FnOnce() -> I,
        I: IntoIterator<Item = EntityId>,
        F: FnOnce(),
    {
        if self.pending_all {
            let before = self.dirty.len();
            self.dirty.extend(population());
            self.pending_all = false;
            tracing::debug!(
                added = self.dirty.len() - before,
                total = self.dirty.len(),
                "Dirty set materialized"
            );
        }

        if !self.dirty.contains(&entity) {
            return false;
        }
        recompute();
        self.dirty.remove(&entity);
        true
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_all
    }

    /// Whether `entity` is in the materialized dirty set.
    ///
    /// A pending commit that has not been expanded yet is not reflected here;
    /// see [`DirtyRecompute::is_pending`].
    #[must_use]
    pub fn is_dirty(&self, entity: EntityId) -> bool {
        self.dirty.contains(&entity)
    }

    #[must_use]
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }
}
