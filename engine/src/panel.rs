//! Change detection for the settings panel.
//!
//! The panel edits the configuration live; only its close commits a batch.
//! Cached incomes depend on the master switch and the production settings, so
//! those are compared across one open/close pair.

use splice_core::DirtyRecompute;
use splice_types::{ConfigurationSnapshot, ProductionInputs};

#[derive(Debug, Clone, Copy, PartialEq)]
struct IncomeInputs {
    enabled: bool,
    production: ProductionInputs,
}

impl IncomeInputs {
    fn of(snapshot: &ConfigurationSnapshot) -> Self {
        Self {
            enabled: snapshot.enabled,
            production: snapshot.mining.production_inputs(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SettingsPanel {
    opened_with: Option<IncomeInputs>,
}

impl SettingsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inputs as they are when the panel opens.
    ///
    /// The host calls this on every frame the panel is drawn; only the first
    /// call of a session counts.
    pub fn open(&mut self, snapshot: &ConfigurationSnapshot) {
        if self.opened_with.is_none() {
            self.opened_with = Some(IncomeInputs::of(snapshot));
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened_with.is_some()
    }

    /// Commit the session. Marks every entity dirty if an income input
    /// changed, and returns whether it did.
    pub fn close(&mut self, snapshot: &ConfigurationSnapshot, dirty: &mut DirtyRecompute) -> bool {
        let Some(before) = self.opened_with.take() else {
            return false;
        };
        if before == IncomeInputs::of(snapshot) {
            return false;
        }
        tracing::info!("Production settings changed; incomes will be recomputed");
        dirty.mark_all_dirty();
        true
    }
}
