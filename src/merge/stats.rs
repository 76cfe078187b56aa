use std::ops::AddAssign;

use serde::Serialize;

/// What a single merge step did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Unchanged,
    Inserted,
    Updated,
    TranslationInserted,
    TranslationUpdated,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub translations_inserted: usize,
    pub translations_updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl MergeStats {
    pub fn record(&mut self, action: MergeAction) {
        match action {
            MergeAction::Unchanged => self.unchanged += 1,
            MergeAction::Inserted => self.inserted += 1,
            MergeAction::Updated => self.updated += 1,
            MergeAction::TranslationInserted => self.translations_inserted += 1,
            MergeAction::TranslationUpdated => self.translations_updated += 1,
        }
    }

    /// Rows written; zero when re-running over unchanged input.
    pub fn mutations(&self) -> usize {
        self.inserted + self.updated + self.translations_inserted + self.translations_updated
    }
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.updated += rhs.updated;
        self.translations_inserted += rhs.translations_inserted;
        self.translations_updated += rhs.translations_updated;
        self.unchanged += rhs.unchanged;
        self.skipped += rhs.skipped;
    }
}
