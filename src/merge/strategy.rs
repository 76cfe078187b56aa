//! Shared merge contract: resolve a string slot, compare, then act.
//!
//! Both ingestion paths look up `SourceString(file, ordinal, identifier)` and
//! skip equal values. What happens on a miss or a divergent value depends on
//! the [`ImportMode`] arm.
use tracing::trace;

use super::error::MergeError;
use super::stats::MergeAction;
use crate::database_ops::ensure::ensure_translation;
use crate::database_ops::models::{CatalogFile, SourceString, Translation};
use crate::database_ops::{CatalogStore, StorageError};

/// Address of one base string inside a file.
#[derive(Debug, Clone, Copy)]
pub struct StringSlot<'a> {
    pub file: &'a CatalogFile,
    pub ordinal: u32,
    pub identifier: &'a str,
}

impl StringSlot<'_> {
    pub fn context(&self) -> String {
        format!("{}: {}", self.file.name, self.identifier)
    }
}

pub trait MergeStrategy {
    /// No base string exists for the slot.
    fn on_missing<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        value: &str,
    ) -> Result<MergeAction, MergeError>;

    /// A base string exists and its value differs from `value`.
    fn on_divergent<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        existing: &SourceString,
        value: &str,
    ) -> Result<MergeAction, MergeError>;
}

/// Resolve → compare → act for one incoming `(identifier, value)`.
pub fn merge_string<S, M>(
    store: &mut S,
    strategy: &mut M,
    slot: &StringSlot<'_>,
    value: &str,
) -> Result<MergeAction, MergeError>
where
    S: CatalogStore,
    M: MergeStrategy,
{
    let existing = store
        .query_string(slot.file, slot.ordinal, slot.identifier)
        .map_err(|err| MergeError::storage(slot.context(), err))?;

    match existing {
        None => strategy.on_missing(store, slot, value),
        Some(existing) if existing.value == value => {
            trace!(slot = %slot.context(), ordinal = slot.ordinal, "unchanged");
            Ok(MergeAction::Unchanged)
        }
        Some(existing) => strategy.on_divergent(store, slot, &existing, value),
    }
}

/// Update the override for `(translation, source)` or create it.
pub fn upsert_translation_string<S: CatalogStore>(
    store: &mut S,
    translation: &Translation,
    source: &SourceString,
    value: &str,
) -> Result<MergeAction, StorageError> {
    match store.query_translation_string(translation, source)? {
        Some(existing) if existing.value == value => Ok(MergeAction::Unchanged),
        Some(existing) => {
            store.update_translation_string(&existing, value)?;
            Ok(MergeAction::TranslationUpdated)
        }
        None => {
            store.insert_translation_string(translation, source, value)?;
            Ok(MergeAction::TranslationInserted)
        }
    }
}

/// Base-language import tagged with a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseImport {
    pub version: i64,
}

impl MergeStrategy for BaseImport {
    fn on_missing<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        value: &str,
    ) -> Result<MergeAction, MergeError> {
        store
            .insert_string(slot.file, self.version, slot.ordinal, slot.identifier, value)
            .map_err(|err| MergeError::storage(slot.context(), err))?;
        Ok(MergeAction::Inserted)
    }

    fn on_divergent<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        existing: &SourceString,
        value: &str,
    ) -> Result<MergeAction, MergeError> {
        store
            .update_string(existing, self.version, value)
            .map_err(|err| MergeError::storage(slot.context(), err))?;
        Ok(MergeAction::Updated)
    }
}

/// Override import into a named translation set. Never creates base strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationImport {
    set_name: String,
    translation: Option<Translation>,
}

impl TranslationImport {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            translation: None,
        }
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    /// Look up or create the translation set, caching it for later strings.
    pub fn resolve<S: CatalogStore>(&mut self, store: &mut S) -> Result<&Translation, StorageError> {
        let translation = match self.translation.take() {
            Some(translation) => translation,
            None => ensure_translation(store, &self.set_name)?,
        };
        Ok(self.translation.insert(translation))
    }

    /// Drop the cached row, e.g. after the bracket that created it failed to commit.
    pub fn invalidate(&mut self) {
        self.translation = None;
    }
}

impl MergeStrategy for TranslationImport {
    fn on_missing<S: CatalogStore>(
        &mut self,
        _store: &mut S,
        slot: &StringSlot<'_>,
        _value: &str,
    ) -> Result<MergeAction, MergeError> {
        Err(MergeError::MissingSourceString {
            file: slot.file.name.clone(),
            identifier: slot.identifier.to_string(),
        })
    }

    fn on_divergent<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        existing: &SourceString,
        value: &str,
    ) -> Result<MergeAction, MergeError> {
        let set_name = self.set_name.clone();
        let translation = self
            .resolve(store)
            .map_err(|err| MergeError::storage(set_name, err))?
            .clone();
        upsert_translation_string(store, &translation, existing, value)
            .map_err(|err| MergeError::storage(slot.context(), err))
    }
}

/// Which kind of import a run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportMode {
    Direct(BaseImport),
    Translation(TranslationImport),
}

impl ImportMode {
    pub fn direct(version: i64) -> Self {
        ImportMode::Direct(BaseImport { version })
    }

    pub fn translation(set_name: impl Into<String>) -> Self {
        ImportMode::Translation(TranslationImport::new(set_name))
    }

    pub fn label(&self) -> String {
        match self {
            ImportMode::Direct(base) => format!("base v{}", base.version),
            ImportMode::Translation(t) => format!("translation {}", t.set_name()),
        }
    }

    pub fn invalidate(&mut self) {
        if let ImportMode::Translation(t) = self {
            t.invalidate();
        }
    }
}

impl MergeStrategy for ImportMode {
    fn on_missing<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        value: &str,
    ) -> Result<MergeAction, MergeError> {
        match self {
            ImportMode::Direct(base) => base.on_missing(store, slot, value),
            ImportMode::Translation(t) => t.on_missing(store, slot, value),
        }
    }

    fn on_divergent<S: CatalogStore>(
        &mut self,
        store: &mut S,
        slot: &StringSlot<'_>,
        existing: &SourceString,
        value: &str,
    ) -> Result<MergeAction, MergeError> {
        match self {
            ImportMode::Direct(base) => base.on_divergent(store, slot, existing, value),
            ImportMode::Translation(t) => t.on_divergent(store, slot, existing, value),
        }
    }
}
