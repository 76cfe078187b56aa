//! Bulk translation import from an externally authored CSV.
//!
//! Records are `path,type,zeroUnk,identifier,value` with no header row. The
//! directory part of `path` is a canonical archive label resolved through the
//! [`ArchiveLabelMap`]; the whole pass runs in one all-or-nothing bracket.
use std::io::Read;

use serde::Serialize;
use tracing::{debug, warn};

use super::collisions::CollisionTracker;
use super::error::MergeError;
use super::mapping::ArchiveLabelMap;
use super::stats::{MergeAction, MergeStats};
use super::strategy::{merge_string, StringSlot, TranslationImport};
use super::transaction::all_or_nothing;
use crate::database_ops::CatalogStore;

const FIELDS_PER_RECORD: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub path: String,
    pub kind: String,
    pub zero_unk: String,
    pub identifier: String,
    pub value: String,
}

/// Read every record up front. Unquoted whitespace at the start of a field
/// is dropped before parsing, so `a, "b, c"` is two fields. A record with the
/// wrong number of fields fails the whole read.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<TranslationRecord>, MergeError> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|err| MergeError::Csv(csv::Error::from(err)))?;

    let trimmed = trim_leading_space(&raw);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(trimmed.as_slice());

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() != FIELDS_PER_RECORD {
            return Err(MergeError::FieldCount {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                found: record.len(),
            });
        }
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        records.push(TranslationRecord {
            path: field(0),
            kind: field(1),
            zero_unk: field(2),
            identifier: field(3),
            value: field(4),
        });
    }
    Ok(records)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Drop blanks that open a field. Quoted content and newlines are kept.
fn trim_leading_space(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut state = FieldState::Start;

    for &byte in raw {
        state = match (state, byte) {
            (FieldState::Start, b' ' | b'\t' | 0x0b | 0x0c) => continue,
            (FieldState::Start, b'"') => FieldState::Quoted,
            (FieldState::Quoted, b'"') => FieldState::QuoteInQuoted,
            (FieldState::QuoteInQuoted, b'"') => FieldState::Quoted,
            (FieldState::Quoted, _) => FieldState::Quoted,
            (_, b',' | b'\n') => FieldState::Start,
            _ => FieldState::Unquoted,
        };
        out.push(byte);
    }
    out
}

/// Split a normalized relative path into `(archive label, file name)`.
fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => (".", path),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CsvReport {
    pub records: usize,
    pub stats: MergeStats,
}

#[derive(Debug)]
pub struct TranslationMergeImporter<'a> {
    labels: &'a ArchiveLabelMap,
    strategy: TranslationImport,
}

impl<'a> TranslationMergeImporter<'a> {
    pub fn new(labels: &'a ArchiveLabelMap, set_name: impl Into<String>) -> Self {
        Self {
            labels,
            strategy: TranslationImport::new(set_name),
        }
    }

    /// Merge all records. An unknown archive label aborts the pass and
    /// nothing from it is kept; missing archives, files or strings and
    /// per-record storage faults are reported and skipped.
    pub fn run<S: CatalogStore>(
        &mut self,
        store: &mut S,
        records: &[TranslationRecord],
    ) -> Result<CsvReport, MergeError> {
        let set_name = self.strategy.set_name().to_string();
        self.strategy
            .resolve(store)
            .map_err(|err| MergeError::storage(set_name, err))?;

        let labels = self.labels;
        let strategy = &mut self.strategy;
        all_or_nothing(store, |store| {
            let mut tracker = CollisionTracker::new();
            let mut report = CsvReport::default();

            for record in records {
                report.records += 1;
                match merge_record(store, labels, strategy, &mut tracker, record) {
                    Ok(action) => report.stats.record(action),
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!(error = %err, "skipping record");
                        report.stats.skipped += 1;
                    }
                }
            }

            debug!(records = report.records, "csv pass finished");
            Ok(report)
        })
    }
}

fn merge_record<S: CatalogStore>(
    store: &mut S,
    labels: &ArchiveLabelMap,
    strategy: &mut TranslationImport,
    tracker: &mut CollisionTracker,
    record: &TranslationRecord,
) -> Result<MergeAction, MergeError> {
    let path = record.path.replace('\\', "/");
    let (label, file_name) = split_path(&path);

    let archive_name = labels.get(label).ok_or_else(|| MergeError::UnknownArchive {
        label: label.to_string(),
    })?;
    let ordinal = tracker.next(&CollisionTracker::path_key(&path, &record.identifier));

    let archive = store
        .query_archive(archive_name)
        .map_err(|err| MergeError::storage(label, err))?
        .ok_or_else(|| MergeError::ArchiveNotFound {
            archive: label.to_string(),
        })?;
    let file = store
        .query_file(&archive, file_name)
        .map_err(|err| MergeError::storage(format!("{label}: {file_name}"), err))?
        .ok_or_else(|| MergeError::FileNotFound {
            archive: label.to_string(),
            file: file_name.to_string(),
        })?;

    let slot = StringSlot {
        file: &file,
        ordinal,
        identifier: &record.identifier,
    };
    merge_string(store, strategy, &slot, &record.value)
}
