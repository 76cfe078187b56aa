use thiserror::Error;

use super::models::{Archive, CatalogFile, SourceString, Translation, TranslationString};
use crate::normalization::archive_name::ArchiveName;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("a transaction is already open")]
    NestedTransaction,
    #[error("no transaction is open")]
    NoTransaction,
    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
}

/// Storage surface the merge engine drives.
///
/// Lookups return `Ok(None)` on a miss; only genuine storage faults are errors.
/// `begin`/`end`/`rollback` form a single, non-reentrant transaction bracket.
pub trait CatalogStore {
    fn query_archive(&mut self, name: &ArchiveName) -> Result<Option<Archive>, StorageError>;
    fn insert_archive(&mut self, name: &ArchiveName) -> Result<Archive, StorageError>;

    fn query_file(
        &mut self,
        archive: &Archive,
        name: &str,
    ) -> Result<Option<CatalogFile>, StorageError>;
    fn insert_file(&mut self, archive: &Archive, name: &str) -> Result<CatalogFile, StorageError>;

    fn query_string(
        &mut self,
        file: &CatalogFile,
        ordinal: u32,
        identifier: &str,
    ) -> Result<Option<SourceString>, StorageError>;
    fn insert_string(
        &mut self,
        file: &CatalogFile,
        version: i64,
        ordinal: u32,
        identifier: &str,
        value: &str,
    ) -> Result<SourceString, StorageError>;
    fn update_string(
        &mut self,
        string: &SourceString,
        version: i64,
        value: &str,
    ) -> Result<SourceString, StorageError>;

    fn query_translation(&mut self, name: &str) -> Result<Option<Translation>, StorageError>;
    fn insert_translation(&mut self, name: &str) -> Result<Translation, StorageError>;

    fn query_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
    ) -> Result<Option<TranslationString>, StorageError>;
    fn insert_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
        value: &str,
    ) -> Result<TranslationString, StorageError>;
    fn update_translation_string(
        &mut self,
        existing: &TranslationString,
        value: &str,
    ) -> Result<TranslationString, StorageError>;

    fn begin(&mut self) -> Result<(), StorageError>;
    /// Commit the open bracket.
    fn end(&mut self) -> Result<(), StorageError>;
    fn rollback(&mut self) -> Result<(), StorageError>;
}
