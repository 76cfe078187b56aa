use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use super::{ArchiveEntry, ArchiveError, ArchiveGroup, ArchiveOpener, OpenedArchive};

/// Reads an unpacked archive stored as a zip file.
///
/// Each top-level directory becomes one group, in order of first appearance;
/// entries at the zip root share a group of their own. An entry's kind is its
/// file extension and its name is the base name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveOpener;

impl ZipArchiveOpener {
    pub fn read<R: Read + Seek>(reader: R) -> Result<OpenedArchive, ArchiveError> {
        let mut zip =
            ZipArchive::new(reader).map_err(|err| ArchiveError::Container(err.to_string()))?;

        let mut groups: Vec<(String, ArchiveGroup)> = Vec::new();
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|err| ArchiveError::Container(err.to_string()))?;
            if entry.is_dir() {
                continue;
            }

            let path = entry.name().replace('\\', "/");
            let (group_key, name) = match path.split_once('/') {
                Some((group, rest)) => (group.to_string(), base_name(rest).to_string()),
                None => (String::new(), path.clone()),
            };
            let kind = name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();

            let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut data)
                .map_err(|err| ArchiveError::Container(format!("{path}: {err}")))?;

            let entry = ArchiveEntry { name, kind, data };
            match groups.iter_mut().find(|(key, _)| *key == group_key) {
                Some((_, group)) => group.files.push(entry),
                None => groups.push((
                    group_key,
                    ArchiveGroup {
                        files: vec![entry],
                    },
                )),
            }
        }

        debug!(groups = groups.len(), "zip archive read");
        Ok(OpenedArchive {
            groups: groups.into_iter().map(|(_, group)| group).collect(),
        })
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl ArchiveOpener for ZipArchiveOpener {
    fn open(&self, path: &Path) -> Result<OpenedArchive, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::read(BufReader::new(file))
    }
}
