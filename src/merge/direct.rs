//! Archive-scan ingestion: every text file of an opened archive is merged
//! inside its own transaction bracket.
use serde::Serialize;
use tracing::{info, warn};

use super::collisions::CollisionTracker;
use super::error::Severity;
use super::stats::MergeStats;
use super::strategy::{merge_string, ImportMode, StringSlot};
use super::transaction::{commit_partial, PartialCommit};
use crate::archive::{OpenedArchive, TextDecoder, TextPair};
use crate::database_ops::ensure::{ensure_archive, ensure_file};
use crate::database_ops::models::{Archive, CatalogFile};
use crate::database_ops::{CatalogStore, StorageError};
use crate::normalization::archive_name::ArchiveName;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// Text files whose bracket committed.
    pub files: usize,
    /// Text files skipped entirely (decode, resolve or bracket failure).
    pub failed_files: usize,
    /// Committed files that stopped before their last string.
    pub abandoned_files: usize,
    pub stats: MergeStats,
}

impl ArchiveReport {
    pub fn absorb(&mut self, other: ArchiveReport) {
        self.files += other.files;
        self.failed_files += other.failed_files;
        self.abandoned_files += other.abandoned_files;
        self.stats += other.stats;
    }
}

#[derive(Debug)]
pub struct DirectImportMerger<D> {
    mode: ImportMode,
    decoder: D,
}

impl<D: TextDecoder> DirectImportMerger<D> {
    pub fn new(mode: ImportMode, decoder: D) -> Self {
        Self { mode, decoder }
    }

    pub fn mode(&self) -> &ImportMode {
        &self.mode
    }

    /// Merge every text file in `archive`. Failures are reported per file and
    /// never stop the remaining files.
    pub fn merge_archive<S: CatalogStore>(
        &mut self,
        store: &mut S,
        name: &ArchiveName,
        archive: &OpenedArchive,
    ) -> ArchiveReport {
        let mut report = ArchiveReport::default();
        let mut resolved: Option<Archive> = None;

        for entry in archive.text_files() {
            info!(archive = %name, file = %entry.name, "importing file");

            let pairs = match self.decoder.decode(&entry.data) {
                Ok(pairs) => pairs,
                Err(err) => {
                    warn!(archive = %name, file = %entry.name, error = %err, "skipping undecodable file");
                    report.failed_files += 1;
                    continue;
                }
            };

            if resolved.is_none() {
                match ensure_archive(store, name) {
                    Ok(row) => resolved = Some(row),
                    Err(err) => {
                        warn!(archive = %name, error = %err, "could not resolve archive");
                        report.failed_files += 1;
                        continue;
                    }
                }
            }
            let Some(archive_row) = resolved.as_ref() else {
                continue;
            };

            let file = match ensure_file(store, archive_row, &entry.name) {
                Ok(file) => file,
                Err(err) => {
                    warn!(archive = %name, file = %entry.name, error = %err, "could not resolve file");
                    report.failed_files += 1;
                    continue;
                }
            };

            match self.merge_file(store, &file, &pairs) {
                Ok(outcome) => {
                    report.files += 1;
                    if let Some(err) = &outcome.first_error {
                        report.abandoned_files += 1;
                        warn!(
                            archive = %name,
                            file = %file.name,
                            committed = outcome.committed(),
                            error = %err,
                            "stopped early; kept strings applied before the error"
                        );
                    }
                    report.stats += outcome.stats;
                }
                Err(err) => {
                    self.mode.invalidate();
                    warn!(archive = %name, file = %file.name, error = %err, "file transaction failed");
                    report.failed_files += 1;
                }
            }
        }

        report
    }

    /// Merge one decoded file. Missing base strings in translation mode skip
    /// just that string; any other error ends the file, and what was applied
    /// up to that point is still committed.
    pub fn merge_file<S: CatalogStore>(
        &mut self,
        store: &mut S,
        file: &CatalogFile,
        pairs: &[TextPair],
    ) -> Result<PartialCommit, StorageError> {
        let mode = &mut self.mode;
        commit_partial(store, |store, stats| {
            let mut tracker = CollisionTracker::new();
            for pair in pairs {
                let slot = StringSlot {
                    file,
                    ordinal: tracker.next(&pair.identifier),
                    identifier: &pair.identifier,
                };
                match merge_string(store, mode, &slot, &pair.value) {
                    Ok(action) => stats.record(action),
                    Err(err) if err.severity() == Severity::Skip => {
                        warn!(error = %err, value = %pair.value, "skipping string");
                        stats.skipped += 1;
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveEntry, ArchiveGroup, TsvTextDecoder};
    use crate::database_ops::db::{CatalogTable, Db};
    use crate::merge::test_support::FlakyStore;

    fn name() -> ArchiveName {
        ArchiveName::parse("00112233445566778899aabbccddeeff").unwrap()
    }

    fn text(name: &str, body: &str) -> ArchiveEntry {
        ArchiveEntry {
            name: name.into(),
            kind: "text".into(),
            data: body.as_bytes().to_vec(),
        }
    }

    fn archive(files: Vec<ArchiveEntry>) -> OpenedArchive {
        OpenedArchive {
            groups: vec![ArchiveGroup { files }],
        }
    }

    fn base_archive() -> OpenedArchive {
        archive(vec![
            text("ui.text", "GREET\tkonnichiwa\nGREET\tyaa\nBYE\tsayonara\n"),
            ArchiveEntry {
                name: "icon.dds".into(),
                kind: "dds".into(),
                data: vec![0, 1, 2],
            },
            text("story.text", "GREET\tohayou\n"),
        ])
    }

    fn base_merger(version: i64) -> DirectImportMerger<TsvTextDecoder> {
        DirectImportMerger::new(ImportMode::direct(version), TsvTextDecoder)
    }

    #[test]
    fn repeated_identifiers_get_first_seen_ordinals() {
        let mut db = Db::open_in_memory().unwrap();
        let report = base_merger(1).merge_archive(&mut db, &name(), &base_archive());

        assert_eq!(report.files, 2);
        assert_eq!(report.stats.inserted, 4);

        let archive = db.query_archive(&name()).unwrap().unwrap();
        let ui = db.query_file(&archive, "ui.text").unwrap().unwrap();
        let ordinals: Vec<(u32, String)> = [(0, "GREET"), (1, "GREET"), (0, "BYE")]
            .iter()
            .map(|(ord, id)| {
                let s = db.query_string(&ui, *ord, id).unwrap().unwrap();
                (s.ordinal, s.value)
            })
            .collect();
        assert_eq!(
            ordinals,
            vec![
                (0, "konnichiwa".to_string()),
                (1, "yaa".to_string()),
                (0, "sayonara".to_string())
            ]
        );

        // Ordinals restart per file.
        let story = db.query_file(&archive, "story.text").unwrap().unwrap();
        assert!(db.query_string(&story, 0, "GREET").unwrap().is_some());
        assert!(db.query_file(&archive, "icon.dds").unwrap().is_none());
    }

    #[test]
    fn second_run_over_same_content_is_a_no_op() {
        let mut db = Db::open_in_memory().unwrap();
        base_merger(1).merge_archive(&mut db, &name(), &base_archive());
        let second = base_merger(1).merge_archive(&mut db, &name(), &base_archive());

        assert_eq!(second.stats.mutations(), 0);
        assert_eq!(second.stats.unchanged, 4);
        assert_eq!(db.count(CatalogTable::Strings).unwrap(), 4);
        assert_eq!(db.count(CatalogTable::Archives).unwrap(), 1);
        assert_eq!(db.count(CatalogTable::Files).unwrap(), 2);
    }

    #[test]
    fn base_import_updates_changed_values_with_new_version() {
        let mut db = Db::open_in_memory().unwrap();
        base_merger(1).merge_archive(&mut db, &name(), &base_archive());

        let changed = archive(vec![text("ui.text", "GREET\tkonnichiwa\nGREET\tyahoo\n")]);
        let report = base_merger(2).merge_archive(&mut db, &name(), &changed);
        assert_eq!(report.stats.updated, 1);
        assert_eq!(report.stats.unchanged, 1);

        let archive_row = db.query_archive(&name()).unwrap().unwrap();
        let ui = db.query_file(&archive_row, "ui.text").unwrap().unwrap();
        let s = db.query_string(&ui, 1, "GREET").unwrap().unwrap();
        assert_eq!((s.version, s.value.as_str()), (2, "yahoo"));
        // Untouched strings keep their version.
        assert_eq!(db.query_string(&ui, 0, "GREET").unwrap().unwrap().version, 1);
    }

    #[test]
    fn translation_mode_only_touches_overrides() {
        let mut db = Db::open_in_memory().unwrap();
        base_merger(1).merge_archive(&mut db, &name(), &base_archive());

        let translated = archive(vec![text(
            "ui.text",
            "GREET\tkonnichiwa\nGREET\thi\nNEW\tunknown\nBYE\tgoodbye\n",
        )]);
        let mut merger = DirectImportMerger::new(ImportMode::translation("eng"), TsvTextDecoder);
        let report = merger.merge_archive(&mut db, &name(), &translated);

        assert_eq!(report.files, 1);
        assert_eq!(report.abandoned_files, 0);
        assert_eq!(report.stats.translations_inserted, 2);
        assert_eq!(report.stats.unchanged, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.stats.inserted + report.stats.updated, 0);
        assert_eq!(db.count(CatalogTable::Strings).unwrap(), 4);
        assert_eq!(db.count(CatalogTable::TranslationStrings).unwrap(), 2);

        let again = merger.merge_archive(&mut db, &name(), &translated);
        assert_eq!(again.stats.mutations(), 0);
    }

    #[test]
    fn storage_fault_keeps_prior_strings_and_moves_to_next_file() {
        let mut store = FlakyStore::new("BOOM");
        let input = archive(vec![
            text("a.text", "ONE\t1\nBOOM\tx\nTWO\t2\n"),
            text("b.text", "THREE\t3\n"),
        ]);

        let report = base_merger(1).merge_archive(&mut store, &name(), &input);

        assert_eq!(report.files, 2);
        assert_eq!(report.abandoned_files, 1);
        assert_eq!(report.stats.inserted, 2);

        let db = &mut store.db;
        let archive_row = db.query_archive(&name()).unwrap().unwrap();
        let a = db.query_file(&archive_row, "a.text").unwrap().unwrap();
        assert!(db.query_string(&a, 0, "ONE").unwrap().is_some());
        assert!(db.query_string(&a, 0, "TWO").unwrap().is_none());
        let b = db.query_file(&archive_row, "b.text").unwrap().unwrap();
        assert!(db.query_string(&b, 0, "THREE").unwrap().is_some());
        assert!(!db.in_transaction());
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let mut db = Db::open_in_memory().unwrap();
        let input = archive(vec![text("bad.text", "no separator here"), text("ok.text", "A\ta")]);

        let report = base_merger(1).merge_archive(&mut db, &name(), &input);
        assert_eq!(report.failed_files, 1);
        assert_eq!(report.files, 1);
        assert_eq!(db.count(CatalogTable::Files).unwrap(), 1);
    }

    #[test]
    fn archives_without_text_are_never_created() {
        let mut db = Db::open_in_memory().unwrap();
        let input = archive(vec![ArchiveEntry {
            name: "model.aqp".into(),
            kind: "aqp".into(),
            data: vec![],
        }]);
        let report = base_merger(1).merge_archive(&mut db, &name(), &input);
        assert_eq!(report, ArchiveReport::default());
        assert_eq!(db.count(CatalogTable::Archives).unwrap(), 0);
    }
}
