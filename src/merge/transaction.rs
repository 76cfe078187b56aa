//! Transaction brackets around merge passes.
//!
//! Two policies: the archive path commits whatever a file managed to apply
//! before it stopped, the CSV path is all-or-nothing.
use tracing::warn;

use super::error::MergeError;
use super::stats::MergeStats;
use crate::database_ops::{CatalogStore, StorageError};

/// Outcome of a bracket that keeps prior successes when it stops early.
#[derive(Debug)]
pub struct PartialCommit {
    pub stats: MergeStats,
    /// The error that ended the body early, if any. Everything applied
    /// before it is committed; nothing after it was attempted.
    pub first_error: Option<MergeError>,
}

impl PartialCommit {
    pub fn committed(&self) -> usize {
        self.stats.mutations()
    }

    pub fn is_complete(&self) -> bool {
        self.first_error.is_none()
    }
}

/// Run `body` in one bracket and commit what it applied, even if it stopped
/// with an error. Only a failure to open or close the bracket is returned as
/// `Err`; in that case nothing from the body survives.
pub fn commit_partial<S, F>(store: &mut S, body: F) -> Result<PartialCommit, StorageError>
where
    S: CatalogStore,
    F: FnOnce(&mut S, &mut MergeStats) -> Result<(), MergeError>,
{
    store.begin()?;
    let mut stats = MergeStats::default();
    let first_error = body(store, &mut stats).err();

    if let Err(err) = store.end() {
        if let Err(rollback_err) = store.rollback() {
            warn!(error = %rollback_err, "rollback after failed commit also failed");
        }
        return Err(err);
    }

    Ok(PartialCommit { stats, first_error })
}

/// Run `body` in one bracket; commit on success, discard everything on error.
pub fn all_or_nothing<S, T, F>(store: &mut S, body: F) -> Result<T, MergeError>
where
    S: CatalogStore,
    F: FnOnce(&mut S) -> Result<T, MergeError>,
{
    store
        .begin()
        .map_err(|err| MergeError::storage("begin transaction", err))?;

    match body(store) {
        Ok(value) => {
            if let Err(err) = store.end() {
                if let Err(rollback_err) = store.rollback() {
                    warn!(error = %rollback_err, "rollback after failed commit also failed");
                }
                return Err(MergeError::storage("commit transaction", err));
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback() {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
