use thiserror::Error;

use crate::database_ops::StorageError;
use crate::normalization::archive_name::ParseError;

/// How far an error reaches when it surfaces during a merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run; nothing uncommitted survives.
    Fatal,
    /// Stop the current file, keep what its bracket already applied.
    Abandon,
    /// Report and move on to the next record, string or file.
    Skip,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{label}: unknown archive name")]
    UnknownArchive { label: String },

    #[error("malformed translation csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("translation csv record {line}: expected 5 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("{context}: {source}")]
    ArchiveName {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("{archive}: archive not found in database")]
    ArchiveNotFound { archive: String },

    #[error("{archive}: {file}: file not found in database")]
    FileNotFound { archive: String, file: String },

    #[error("{file}: {identifier}: translated identifier does not exist")]
    MissingSourceString { file: String, identifier: String },

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },
}

impl MergeError {
    pub fn storage(context: impl Into<String>, source: StorageError) -> Self {
        MergeError::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            MergeError::UnknownArchive { .. }
            | MergeError::Csv(_)
            | MergeError::FieldCount { .. } => Severity::Fatal,
            MergeError::Storage { .. } => Severity::Abandon,
            MergeError::ArchiveName { .. }
            | MergeError::ArchiveNotFound { .. }
            | MergeError::FileNotFound { .. }
            | MergeError::MissingSourceString { .. } => Severity::Skip,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
