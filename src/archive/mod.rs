//! Collaborator surfaces for archive containers and text chunks.
//!
//! The merge engine only sees fully materialized [`OpenedArchive`]s and
//! decoded [`TextPair`] lists. The readers in this module are simple stand-ins
//! for the game's own container and text formats.
use std::path::Path;

use thiserror::Error;

pub mod text;
pub mod zip_archive;

pub use text::TsvTextDecoder;
pub use zip_archive::ZipArchiveOpener;

/// Entry kind the merge engine consumes.
pub const TEXT_KIND: &str = "text";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable archive: {0}")]
    Container(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("text data is not valid UTF-8")]
    Utf8,
    #[error("line {line}: expected `identifier<TAB>value`")]
    MissingSeparator { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub kind: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn is_text(&self) -> bool {
        self.kind == TEXT_KIND
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveGroup {
    pub files: Vec<ArchiveEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenedArchive {
    pub groups: Vec<ArchiveGroup>,
}

impl OpenedArchive {
    /// Text entries across all groups, in group then file order.
    pub fn text_files(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.groups
            .iter()
            .flat_map(|group| group.files.iter())
            .filter(|entry| entry.is_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPair {
    pub identifier: String,
    pub value: String,
}

impl TextPair {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
        }
    }
}

pub trait ArchiveOpener {
    fn open(&self, path: &Path) -> Result<OpenedArchive, ArchiveError>;
}

pub trait TextDecoder {
    fn decode(&self, data: &[u8]) -> Result<Vec<TextPair>, DecodeError>;
}
