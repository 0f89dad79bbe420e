use garden_core::SaveRecord;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{PersistenceError, SaveStore};

/// A save file holding one JSON document.
///
/// Writes go to `{path}.tmp` and are renamed over the target once flushed, so
/// a crash mid-write leaves the previous save intact. A missing file loads as
/// "no save"; an unreadable or corrupt file is an error. A corrupt file is
/// moved aside to `{path}.corrupt` so later saves do not overwrite it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where an undecodable save is kept.
    fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

fn atomic_write(path: &Path, tmp: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, path)
}

impl SaveStore for FileStore {
    fn save(&self, record: &SaveRecord) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        atomic_write(&self.path, &self.tmp_path(), &bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "save written");
        Ok(())
    }

    fn load(&self) -> Result<Option<SaveRecord>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                let aside = self.corrupt_path();
                match fs::rename(&self.path, &aside) {
                    Ok(()) => warn!(path = %aside.display(), error = %e, "corrupt save moved aside"),
                    Err(io) => warn!(path = %self.path.display(), error = %io, "could not move corrupt save"),
                }
                Err(e.into())
            }
        }
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        for p in [self.path.clone(), self.tmp_path()] {
            match fs::remove_file(&p) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    /// Unique scratch directory per test.
    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "idle_garden_file_store_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_is_no_save() {
        let dir = test_dir("missing");
        let store = FileStore::new(dir.join("save.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn roundtrip_creates_parent_dirs() {
        let dir = test_dir("roundtrip");
        let store = FileStore::new(dir.join("nested/save.json"));
        let rec = sample_record(1_234.5);
        store.save(&rec).unwrap();
        assert_eq!(store.load().unwrap(), Some(rec));
        assert!(!store.tmp_path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = test_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("save.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Codec(_))));
        // kept for recovery; the slot itself now reads as empty
        assert_eq!(fs::read(store.corrupt_path()).unwrap(), b"{not json");
        assert!(!path.exists());
        assert!(store.load().unwrap().is_none());

        store.save(&sample_record(2.0)).unwrap();
        assert_eq!(fs::read(store.corrupt_path()).unwrap(), b"{not json");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = test_dir("clear");
        let store = FileStore::new(dir.join("save.json"));
        store.clear().unwrap();
        store.save(&sample_record(3.0)).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
