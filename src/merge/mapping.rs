//! Hand-authored archive label list (`--aidaskits`).
//!
//! Each line: `<archive> <header> <group> <label>`. Only the first and last
//! tokens matter; lines that do not fit are noise and get skipped.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::normalization::archive_name::ArchiveName;

const TOKENS_PER_LINE: usize = 4;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("archive list line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Canonical archive label → resolved archive key.
#[derive(Debug, Default, Clone)]
pub struct ArchiveLabelMap {
    labels: HashMap<String, ArchiveName>,
    skipped: usize,
}

impl ArchiveLabelMap {
    pub fn from_path(path: &Path) -> Result<Self, MappingError> {
        let file = File::open(path).map_err(|source| MappingError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(BufReader::new(file))
    }

    /// Read every line until end of input. Lines that are not valid UTF-8
    /// are skipped like any other malformed line; only read faults fail.
    pub fn load<R: BufRead>(mut reader: R) -> Result<Self, MappingError> {
        let mut map = Self::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            line_no += 1;
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| MappingError::Read {
                    line: line_no,
                    source,
                })?;
            if read == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(err) => {
                    warn!(line = line_no, error = %err, "archive list: skipping line that is not UTF-8");
                    map.skipped += 1;
                    continue;
                }
            };

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != TOKENS_PER_LINE {
                warn!(line = line_no, tokens = tokens.len(), "archive list: skipping malformed line");
                map.skipped += 1;
                continue;
            }

            let (raw_archive, label) = (tokens[0], tokens[3]);
            match ArchiveName::parse(raw_archive) {
                Ok(name) => {
                    map.labels.insert(label.to_string(), name);
                }
                Err(err) => {
                    warn!(line = line_no, error = %err, "archive list: skipping line");
                    map.skipped += 1;
                }
            }
        }

        debug!(labels = map.labels.len(), skipped = map.skipped, "archive list loaded");
        Ok(map)
    }

    pub fn get(&self, label: &str) -> Option<&ArchiveName> {
        self.labels.get(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Lines that were dropped as malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    const A: &str = "0123456789abcdef0123456789abcdef";
    const B: &str = "fedcba9876543210fedcba9876543210";

    #[test]
    fn loads_labels_and_skips_noise() {
        let input = format!(
            "{A} hdr grp skits/0001\n\
             \n\
             # not a record\n\
             {B} hdr grp\n\
             nothex hdr grp skits/0002\n\
             {B}_na hdr grp skits/0003\n"
        );
        let map = ArchiveLabelMap::load(Cursor::new(input)).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("skits/0001").unwrap().hash(), A);
        assert_eq!(map.get("skits/0003").unwrap().variant(), Some("na"));
        assert!(map.get("skits/0002").is_none());
        assert_eq!(map.skipped(), 3);
    }

    #[test]
    fn later_lines_replace_earlier_labels() {
        let input = format!("{A} h g label\n{B} h g label");
        let map = ArchiveLabelMap::load(Cursor::new(input)).unwrap();
        assert_eq!(map.get("label").unwrap().hash(), B);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn read_faults_are_errors() {
        let err = ArchiveLabelMap::load(BufReader::new(FailingReader)).unwrap_err();
        assert!(matches!(err, MappingError::Read { line: 1, .. }));
    }

    #[test]
    fn lines_that_are_not_utf8_are_skipped() {
        let mut input: Vec<u8> = b"\xff\xfe noise\n".to_vec();
        input.extend_from_slice(format!("{A} hdr grp skits/0001\n").as_bytes());

        let map = ArchiveLabelMap::load(Cursor::new(input)).unwrap();
        assert_eq!(map.skipped(), 1);
        assert_eq!(map.get("skits/0001").unwrap().hash(), A);
    }
}
