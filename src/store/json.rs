//! JSON file record store.
//!
//! The whole library is one JSON array. Every write rewrites the file through a
//! temporary sibling and a rename, so a crash mid-write leaves the previous
//! file intact.

use super::memory::MemoryStore;
use super::{RecordStore, sample_records};
use crate::defaults::now_ms;
use crate::error::{Result, RouteDrillError};
use crate::record::AddressRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file means an empty library.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_seed(path, false)
    }

    /// Open the store, writing the sample streets first when the file does not
    /// exist yet and `seed` is set.
    pub fn open_with_seed(path: &Path, seed: bool) -> Result<Self> {
        let records = match fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str::<Vec<AddressRecord>>(&contents).map_err(
                |source| RouteDrillError::StoreFormat {
                    path: path.display().to_string(),
                    source,
                },
            )?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut store = Self {
                    path: path.to_path_buf(),
                    records: MemoryStore::default(),
                };
                if seed {
                    info!(path = %path.display(), "creating record store with sample streets");
                    let seeded = MemoryStore::new(sample_records(now_ms()));
                    store.commit(seeded)?;
                }
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), records = records.len(), "opened record store");
        Ok(Self {
            path: path.to_path_buf(),
            records: MemoryStore::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `next` to disk, then make it the in-memory state.
    fn commit(&mut self, next: MemoryStore) -> Result<()> {
        self.write(&next)?;
        self.records = next;
        Ok(())
    }

    fn write(&self, records: &MemoryStore) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records.records()).map_err(|source| {
            RouteDrillError::StoreFormat {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), records = records.len(), "wrote record store");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn get_all(&self) -> Result<Vec<AddressRecord>> {
        self.records.get_all()
    }

    fn get(&self, id: &str) -> Result<Option<AddressRecord>> {
        self.records.get(id)
    }

    fn put(&mut self, record: AddressRecord) -> Result<()> {
        let mut next = self.records.clone();
        next.put(record)?;
        self.commit(next)
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        let mut next = self.records.clone();
        let existed = next.delete(id)?;
        if existed {
            self.commit(next)?;
        }
        Ok(existed)
    }

    fn put_many(&mut self, records: Vec<AddressRecord>) -> Result<()> {
        let mut next = self.records.clone();
        next.put_many(records)?;
        self.commit(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewRecord;
    use tempfile::TempDir;

    fn record(id: &str, name: &str) -> AddressRecord {
        AddressRecord::create(id.to_string(), NewRecord::new(name, "zone"), String::new(), 0)
    }

    #[test]
    fn missing_file_opens_empty_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get_all().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn seed_writes_sample_streets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("records.json");
        let store = JsonFileStore::open_with_seed(&path, true).unwrap();
        assert_eq!(store.get_all().unwrap().len(), 8);
        assert!(path.exists());

        let reopened = JsonFileStore::open_with_seed(&path, true).unwrap();
        assert_eq!(reopened.get_all().unwrap().len(), 8, "seed only applies once");
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put(record("a", "文三路")).unwrap();
        store.put(record("b", "延安路")).unwrap();
        assert!(store.delete("b").unwrap());

        let reopened = JsonFileStore::open(&path).unwrap();
        let all = reopened.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].street_name, "文三路");
        assert!(!dir.path().join("records.json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.put(record("a", "文三路")).unwrap();

        // A directory where the temp file goes makes every write fail.
        fs::create_dir(dir.path().join("records.json.tmp")).unwrap();

        assert!(store.put(record("b", "延安路")).is_err());
        assert!(store.put_many(vec![record("c", "学院路")]).is_err());
        assert!(store.delete("a").is_err());

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "a");
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn corrupt_file_reports_store_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "[{\"id\": ").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, RouteDrillError::StoreFormat { .. }), "got {err}");
    }

    #[test]
    fn empty_file_is_empty_library() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::open(&path).unwrap().get_all().unwrap().is_empty());
    }
}
