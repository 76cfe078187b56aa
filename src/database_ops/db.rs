use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::models::{Archive, CatalogFile, SourceString, Translation, TranslationString};
use super::store::{CatalogStore, StorageError};
use crate::normalization::archive_name::ArchiveName;

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS archives (
    id      INTEGER PRIMARY KEY,
    hash    TEXT NOT NULL,
    variant TEXT NOT NULL DEFAULT '',
    UNIQUE (hash, variant)
);

CREATE TABLE IF NOT EXISTS files (
    id         INTEGER PRIMARY KEY,
    archive_id INTEGER NOT NULL REFERENCES archives(id),
    name       TEXT NOT NULL,
    UNIQUE (archive_id, name)
);

CREATE TABLE IF NOT EXISTS strings (
    id         INTEGER PRIMARY KEY,
    file_id    INTEGER NOT NULL REFERENCES files(id),
    version    INTEGER NOT NULL,
    collision  INTEGER NOT NULL,
    identifier TEXT NOT NULL,
    value      TEXT NOT NULL,
    UNIQUE (file_id, identifier, collision)
);

CREATE TABLE IF NOT EXISTS translations (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS translation_strings (
    id             INTEGER PRIMARY KEY,
    translation_id INTEGER NOT NULL REFERENCES translations(id),
    string_id      INTEGER NOT NULL REFERENCES strings(id),
    value          TEXT NOT NULL,
    UNIQUE (translation_id, string_id)
);
"#;

/// SQLite-backed catalog. Owns the single connection; at most one
/// transaction bracket is open at a time.
#[derive(Debug)]
pub struct Db {
    conn: Connection,
    in_transaction: bool,
}

impl Db {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        debug!("catalog schema ready");
        Ok(Self {
            conn,
            in_transaction: false,
        })
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Row count of a catalog table, for summaries and tests.
    pub fn count(&self, table: CatalogTable) -> Result<i64, StorageError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Archives,
    Files,
    Strings,
    Translations,
    TranslationStrings,
}

impl CatalogTable {
    fn as_str(self) -> &'static str {
        match self {
            CatalogTable::Archives => "archives",
            CatalogTable::Files => "files",
            CatalogTable::Strings => "strings",
            CatalogTable::Translations => "translations",
            CatalogTable::TranslationStrings => "translation_strings",
        }
    }
}

fn archive_from_row(row: &Row<'_>) -> rusqlite::Result<Archive> {
    let variant: String = row.get(2)?;
    Ok(Archive {
        id: row.get(0)?,
        name: ArchiveName::from_parts(row.get(1)?, Some(variant).filter(|v| !v.is_empty())),
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogFile> {
    Ok(CatalogFile {
        id: row.get(0)?,
        archive_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn string_from_row(row: &Row<'_>) -> rusqlite::Result<SourceString> {
    Ok(SourceString {
        id: row.get(0)?,
        file_id: row.get(1)?,
        version: row.get(2)?,
        ordinal: row.get(3)?,
        identifier: row.get(4)?,
        value: row.get(5)?,
    })
}

fn translation_from_row(row: &Row<'_>) -> rusqlite::Result<Translation> {
    Ok(Translation {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn translation_string_from_row(row: &Row<'_>) -> rusqlite::Result<TranslationString> {
    Ok(TranslationString {
        id: row.get(0)?,
        translation_id: row.get(1)?,
        string_id: row.get(2)?,
        value: row.get(3)?,
    })
}

impl CatalogStore for Db {
    fn query_archive(&mut self, name: &ArchiveName) -> Result<Option<Archive>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, hash, variant FROM archives WHERE hash = ?1 AND variant = ?2",
                params![name.hash(), name.variant().unwrap_or("")],
                archive_from_row,
            )
            .optional()?)
    }

    fn insert_archive(&mut self, name: &ArchiveName) -> Result<Archive, StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO archives (hash, variant) VALUES (?1, ?2)",
            params![name.hash(), name.variant().unwrap_or("")],
        )?;
        self.query_archive(name)?
            .ok_or_else(|| StorageError::InvalidRow(format!("archive {name} vanished after insert")))
    }

    fn query_file(
        &mut self,
        archive: &Archive,
        name: &str,
    ) -> Result<Option<CatalogFile>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, archive_id, name FROM files WHERE archive_id = ?1 AND name = ?2",
                params![archive.id, name],
                file_from_row,
            )
            .optional()?)
    }

    fn insert_file(&mut self, archive: &Archive, name: &str) -> Result<CatalogFile, StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO files (archive_id, name) VALUES (?1, ?2)",
            params![archive.id, name],
        )?;
        self.query_file(archive, name)?.ok_or_else(|| {
            StorageError::InvalidRow(format!("file {}:{name} vanished after insert", archive.name))
        })
    }

    fn query_string(
        &mut self,
        file: &CatalogFile,
        ordinal: u32,
        identifier: &str,
    ) -> Result<Option<SourceString>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, file_id, version, collision, identifier, value FROM strings \
                 WHERE file_id = ?1 AND collision = ?2 AND identifier = ?3",
                params![file.id, ordinal, identifier],
                string_from_row,
            )
            .optional()?)
    }

    fn insert_string(
        &mut self,
        file: &CatalogFile,
        version: i64,
        ordinal: u32,
        identifier: &str,
        value: &str,
    ) -> Result<SourceString, StorageError> {
        self.conn.execute(
            "INSERT INTO strings (file_id, version, collision, identifier, value) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![file.id, version, ordinal, identifier, value],
        )?;
        Ok(SourceString {
            id: self.conn.last_insert_rowid(),
            file_id: file.id,
            version,
            ordinal,
            identifier: identifier.to_string(),
            value: value.to_string(),
        })
    }

    fn update_string(
        &mut self,
        string: &SourceString,
        version: i64,
        value: &str,
    ) -> Result<SourceString, StorageError> {
        self.conn.execute(
            "UPDATE strings SET version = ?1, value = ?2 WHERE id = ?3",
            params![version, value, string.id],
        )?;
        Ok(SourceString {
            version,
            value: value.to_string(),
            ..string.clone()
        })
    }

    fn query_translation(&mut self, name: &str) -> Result<Option<Translation>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM translations WHERE name = ?1",
                params![name],
                translation_from_row,
            )
            .optional()?)
    }

    fn insert_translation(&mut self, name: &str) -> Result<Translation, StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO translations (name) VALUES (?1)",
            params![name],
        )?;
        self.query_translation(name)?
            .ok_or_else(|| StorageError::InvalidRow(format!("translation {name} vanished after insert")))
    }

    fn query_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
    ) -> Result<Option<TranslationString>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, translation_id, string_id, value FROM translation_strings \
                 WHERE translation_id = ?1 AND string_id = ?2",
                params![translation.id, string.id],
                translation_string_from_row,
            )
            .optional()?)
    }

    fn insert_translation_string(
        &mut self,
        translation: &Translation,
        string: &SourceString,
        value: &str,
    ) -> Result<TranslationString, StorageError> {
        self.conn.execute(
            "INSERT INTO translation_strings (translation_id, string_id, value) VALUES (?1, ?2, ?3)",
            params![translation.id, string.id, value],
        )?;
        Ok(TranslationString {
            id: self.conn.last_insert_rowid(),
            translation_id: translation.id,
            string_id: string.id,
            value: value.to_string(),
        })
    }

    fn update_translation_string(
        &mut self,
        existing: &TranslationString,
        value: &str,
    ) -> Result<TranslationString, StorageError> {
        self.conn.execute(
            "UPDATE translation_strings SET value = ?1 WHERE id = ?2",
            params![value, existing.id],
        )?;
        Ok(TranslationString {
            value: value.to_string(),
            ..existing.clone()
        })
    }

    fn begin(&mut self) -> Result<(), StorageError> {
        if self.in_transaction {
            return Err(StorageError::NestedTransaction);
        }
        self.conn.execute_batch("BEGIN")?;
        self.in_transaction = true;
        Ok(())
    }

    fn end(&mut self) -> Result<(), StorageError> {
        if !self.in_transaction {
            return Err(StorageError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        if !self.in_transaction {
            return Err(StorageError::NoTransaction);
        }
        // The bracket is closed even if SQLite already rolled back on its own.
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
