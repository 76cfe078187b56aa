//! Row types for the localization catalog.
use crate::normalization::archive_name::ArchiveName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub id: i64,
    pub name: ArchiveName,
}

/// One file inside an archive. Named to stay clear of `std::fs::File`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub id: i64,
    pub archive_id: i64,
    pub name: String,
}

/// Base-language entry keyed by (file, identifier, ordinal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceString {
    pub id: i64,
    pub file_id: i64,
    /// Import version that last wrote `value`.
    pub version: i64,
    pub ordinal: u32,
    pub identifier: String,
    pub value: String,
}

/// A named override set such as `eng` or `story-eng`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationString {
    pub id: i64,
    pub translation_id: i64,
    pub string_id: i64,
    pub value: String,
}
