//! Fault-injecting store for merge tests.
use crate::database_ops::models::{
    Archive, CatalogFile, SourceString, Translation, TranslationString,
};
use crate::database_ops::{CatalogStore, Db, StorageError};
use crate::normalization::archive_name::ArchiveName;

/// Wraps a [`Db`] and fails every string lookup for one identifier.
pub(crate) struct FlakyStore {
    pub db: Db,
    pub fail_on: String,
}

impl FlakyStore {
    pub fn new(fail_on: &str) -> Self {
        Self {
            db: Db::open_in_memory().unwrap(),
            fail_on: fail_on.to_string(),
        }
    }
}

impl CatalogStore for FlakyStore {
    fn query_archive(&mut self, name: &ArchiveName) -> Result<Option<Archive>, StorageError> {
        self.db.query_archive(name)
    }

    fn insert_archive(&mut self, name: &ArchiveName) -> Result<Archive, StorageError> {
        self.db.insert_archive(name)
    }

    fn query_file(
        &mut self,
        archive: &Archive,
        name: &str,
    ) -> Result<Option<CatalogFile>, StorageError> {
        self.db.query_file(archive, name)
    }

    fn insert_file(&mut self, archive: &Archive, name: &str) -> Result<CatalogFile, StorageError> {
        self.db.insert_file(archive, name)
    }

    fn query_string(
        &mut self,
        file: &CatalogFile,
        ordinal: u32,
        identifier: &str,
    ) -> Result<Option<SourceString>, StorageError> {
        if identifier == self.fail_on {
            return Err(StorageError::InvalidRow(format!("injected fault for {identifier}")));
        }
        self.db.query_string(file, ordinal, identifier)
    }

    fn insert_string(
        &mut self,
        file: &CatalogFile,
        version: i64,
        ordinal: u32,
        identifier: &str,
        value: &str,
    ) -> Result<SourceString, StorageError> {
        self.db.insert_string(file, version, ordinal, identifier, value)
    }

    fn update_string(
        &mut self,
        string: &SourceString,
        version: i64,
        value: &str,
    ) -> Result<SourceString, StorageError> {
        self.db.update_string(string, version, value)
    }

    fn query_translation(&mut self, name: &str) -> Result<Option<Translation>, StorageError> {
        self.db.query_translation(name)
    }

    fn insert_translation(&mut self, name: &str) -> Result<Translation, StorageError> {
        self.db.insert_translation(name)
    }

    fn query_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
    ) -> Result<Option<TranslationString>, StorageError> {
        self.db.query_translation_string(translation, string)
    }

    fn insert_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
        value: &str,
    ) -> Result<TranslationString, StorageError> {
        self.db.insert_translation_string(translation, string, value)
    }

    fn update_translation_string(
        &mut self,
        existing: &TranslationString,
        value: &str,
    ) -> Result<TranslationString, StorageError> {
        self.db.update_translation_string(existing, value)
    }

    fn begin(&mut self) -> Result<(), StorageError> {
        self.db.begin()
    }

    fn end(&mut self) -> Result<(), StorageError> {
        self.db.end()
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        self.db.rollback()
    }
}
