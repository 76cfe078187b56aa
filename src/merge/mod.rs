//! Translation merge engine: key resolution, ordinal assignment and the two
//! ingestion paths that share one merge contract.
pub mod collisions;
pub mod csv_import;
pub mod direct;
pub mod error;
pub mod mapping;
pub mod stats;
pub mod strategy;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_support;

pub use collisions::CollisionTracker;
pub use csv_import::{read_records, CsvReport, TranslationMergeImporter, TranslationRecord};
pub use direct::{ArchiveReport, DirectImportMerger};
pub use error::{MergeError, Severity};
pub use mapping::{ArchiveLabelMap, MappingError};
pub use stats::{MergeAction, MergeStats};
pub use strategy::{ImportMode, MergeStrategy};
pub use transaction::PartialCommit;
