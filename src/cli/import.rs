use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::{ArchiveOpener, TextDecoder, TsvTextDecoder, ZipArchiveOpener};
use crate::database_ops::{CatalogStore, Db};
use crate::merge::{
    read_records, ArchiveLabelMap, ArchiveReport, DirectImportMerger, ImportMode, MergeStats,
    TranslationMergeImporter,
};
use crate::normalization::archive_name::ArchiveName;
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Catalog path; falls back to `PSO2_TRANS_DB`.
    pub database: Option<PathBuf>,
    /// Import version tag written on base strings. Must be non-zero.
    pub version: i64,
    /// Translation set name; selects translation mode.
    pub translation: Option<String>,
    /// Archive label list for the CSV path.
    pub skits: Option<PathBuf>,
    /// Translation CSV for the CSV path.
    pub strings: Option<PathBuf>,
    /// Archive files for the archive path.
    pub archives: Vec<PathBuf>,
}

/// Validated shape of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPlan {
    Csv {
        skits: PathBuf,
        strings: PathBuf,
        translation: String,
    },
    Archives {
        mode: ImportMode,
        archives: Vec<PathBuf>,
    },
}

impl ImportConfig {
    pub fn plan(&self) -> Result<ImportPlan> {
        if self.version == 0 {
            bail!("import version must be non-zero");
        }

        if self.skits.is_some() || self.strings.is_some() {
            let (Some(skits), Some(strings), Some(translation)) =
                (&self.skits, &self.strings, &self.translation)
            else {
                bail!("--aidaskits, --aidastrings, and --trans must all be specified together");
            };
            if !self.archives.is_empty() {
                warn!(
                    count = self.archives.len(),
                    "archive arguments are ignored when importing from CSV"
                );
            }
            return Ok(ImportPlan::Csv {
                skits: skits.clone(),
                strings: strings.clone(),
                translation: translation.clone(),
            });
        }

        let mode = match &self.translation {
            Some(name) => ImportMode::translation(name.clone()),
            None => ImportMode::direct(self.version),
        };
        Ok(ImportPlan::Archives {
            mode,
            archives: self.archives.clone(),
        })
    }
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub mode: String,
    pub archives: usize,
    pub failed_archives: usize,
    pub files: usize,
    pub failed_files: usize,
    pub abandoned_files: usize,
    pub records: usize,
    pub label_lines_skipped: usize,
    pub stats: MergeStats,
}

pub fn run(cfg: ImportConfig) -> Result<ImportSummary> {
    env_util::init_env();

    let plan = cfg.plan()?;
    let db_path = env_util::db_path(cfg.database.clone())?;
    info!(path = %db_path.display(), "opening database");
    let mut db = Db::open(&db_path)
        .with_context(|| format!("open database `{}`", db_path.display()))?;

    let summary = match plan {
        ImportPlan::Csv {
            skits,
            strings,
            translation,
        } => import_csv(&mut db, &skits, &strings, &translation)?,
        ImportPlan::Archives { mode, archives } => {
            if archives.is_empty() {
                warn!("no archives given; nothing to import");
            }
            import_archives(
                &mut db,
                &ZipArchiveOpener,
                TsvTextDecoder,
                mode,
                &archives,
            )
        }
    };

    info!(
        mode = %summary.mode,
        mutations = summary.stats.mutations(),
        skipped = summary.stats.skipped,
        "import complete"
    );
    Ok(summary)
}

/// CSV path. Every failure here is fatal for the run.
pub fn import_csv<S: CatalogStore>(
    store: &mut S,
    skits: &Path,
    strings: &Path,
    translation: &str,
) -> Result<ImportSummary> {
    info!(skits = %skits.display(), strings = %strings.display(), "importing from CSV");

    let labels = ArchiveLabelMap::from_path(skits)
        .with_context(|| format!("read archive list `{}`", skits.display()))?;

    let file = File::open(strings).with_context(|| format!("open `{}`", strings.display()))?;
    let records = read_records(BufReader::new(file))
        .with_context(|| format!("read `{}`", strings.display()))?;

    let mut importer = TranslationMergeImporter::new(&labels, translation);
    let report = importer
        .run(store, &records)
        .with_context(|| format!("import `{}`", strings.display()))?;

    Ok(ImportSummary {
        mode: format!("csv translation {translation}"),
        records: report.records,
        label_lines_skipped: labels.skipped(),
        stats: report.stats,
        ..ImportSummary::default()
    })
}

/// Archive path. Failures are reported per archive or file; the run goes on.
pub fn import_archives<S, O, D>(
    store: &mut S,
    opener: &O,
    decoder: D,
    mode: ImportMode,
    paths: &[PathBuf],
) -> ImportSummary
where
    S: CatalogStore,
    O: ArchiveOpener,
    D: TextDecoder,
{
    let mut merger = DirectImportMerger::new(mode, decoder);
    let mut summary = ImportSummary {
        mode: merger.mode().label(),
        ..ImportSummary::default()
    };
    let mut totals = ArchiveReport::default();

    for path in paths {
        summary.archives += 1;
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match ArchiveName::parse(&base) {
            Ok(name) => name,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping archive");
                summary.failed_archives += 1;
                continue;
            }
        };

        info!(path = %path.display(), "opening archive");
        let archive = match opener.open(path) {
            Ok(archive) => archive,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping archive");
                summary.failed_archives += 1;
                continue;
            }
        };

        totals.absorb(merger.merge_archive(store, &name, &archive));
    }

    summary.files = totals.files;
    summary.failed_files = totals.failed_files;
    summary.abandoned_files = totals.abandoned_files;
    summary.stats = totals.stats;
    summary
}
