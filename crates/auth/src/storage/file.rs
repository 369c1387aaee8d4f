use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::types::StorageResult;

/// Store backed by a JSON object in a single file.
///
/// Writes go through a sibling temporary file and a rename so a crash never
/// leaves a half-written document behind. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = fs::write(&tmp, serde_json::to_vec_pretty(entries)?)
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!(path = %self.path.display(), "persisted key/value store");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageError;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        assert_eq!(store.get("authToken").unwrap(), None);
        store.remove("authToken").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_a_new_handle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/session.json");

        FileStore::new(&path).set("authToken", "T1").unwrap();
        let reopened = FileStore::new(&path);

        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        store.set("authToken", "T1").unwrap();
        store.set("theme", "dark").unwrap();

        store.remove("authToken").unwrap();

        assert_eq!(store.get("authToken").unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileStore::new(&path).get("authToken").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn failed_rename_leaves_no_temporary_file() {
        let dir = TempDir::new().unwrap();
        // a directory in the target's place makes the rename fail
        let path = dir.path().join("session.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let store = FileStore::new(&path);
        let err = store.write_entries(&BTreeMap::new()).unwrap_err();

        assert!(matches!(err, StorageError::Io(_)));
        assert!(!dir.path().join("session.json.tmp").exists());
    }
}
