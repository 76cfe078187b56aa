//! Lazy get-or-create helpers. The unique constraints behind `insert_*`
//! keep these safe to repeat.
use tracing::debug;

use super::models::{Archive, CatalogFile, Translation};
use super::store::{CatalogStore, StorageError};
use crate::normalization::archive_name::ArchiveName;

pub fn ensure_archive<S: CatalogStore>(
    store: &mut S,
    name: &ArchiveName,
) -> Result<Archive, StorageError> {
    if let Some(archive) = store.query_archive(name)? {
        return Ok(archive);
    }
    let archive = store.insert_archive(name)?;
    debug!(archive = %name, id = archive.id, "created archive");
    Ok(archive)
}

pub fn ensure_file<S: CatalogStore>(
    store: &mut S,
    archive: &Archive,
    name: &str,
) -> Result<CatalogFile, StorageError> {
    if let Some(file) = store.query_file(archive, name)? {
        return Ok(file);
    }
    let file = store.insert_file(archive, name)?;
    debug!(archive = %archive.name, file = name, id = file.id, "created file");
    Ok(file)
}

pub fn ensure_translation<S: CatalogStore>(
    store: &mut S,
    name: &str,
) -> Result<Translation, StorageError> {
    if let Some(translation) = store.query_translation(name)? {
        return Ok(translation);
    }
    let translation = store.insert_translation(name)?;
    debug!(translation = name, id = translation.id, "created translation set");
    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::db::{CatalogTable, Db};

    #[test]
    fn ensure_is_idempotent() {
        let mut db = Db::open_in_memory().unwrap();
        let name = ArchiveName::parse("ffffffffffffffffffffffffffffffff").unwrap();

        let a1 = ensure_archive(&mut db, &name).unwrap();
        let a2 = ensure_archive(&mut db, &name).unwrap();
        assert_eq!(a1.id, a2.id);

        let f1 = ensure_file(&mut db, &a1, "ui.text").unwrap();
        let f2 = ensure_file(&mut db, &a2, "ui.text").unwrap();
        assert_eq!(f1.id, f2.id);

        let t1 = ensure_translation(&mut db, "story-eng").unwrap();
        let t2 = ensure_translation(&mut db, "story-eng").unwrap();
        assert_eq!(t1.id, t2.id);

        assert_eq!(db.count(CatalogTable::Archives).unwrap(), 1);
        assert_eq!(db.count(CatalogTable::Files).unwrap(), 1);
        assert_eq!(db.count(CatalogTable::Translations).unwrap(), 1);
    }
}
