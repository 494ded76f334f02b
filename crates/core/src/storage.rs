//! Durable client-side key-value storage.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Synchronous string key-value store. Each call touches a single key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file through a temporary sibling that is
/// renamed into place, so readers never observe a partial file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store persisting to `path`; the file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(Some(content).filter(|content| !content.trim().is_empty()))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_raw()? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", self.path.display())),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Entries to rewrite, plus whether the file on disk was unreadable and
    /// must be replaced regardless.
    fn read_for_update(&self) -> Result<(BTreeMap<String, String>, bool)> {
        let Some(content) = self.read_raw()? else {
            return Ok((BTreeMap::new(), false));
        };
        match serde_json::from_str(&content) {
            Ok(entries) => Ok((entries, false)),
            Err(err) => {
                warn!(%err, path = %self.path.display(), "Discarding unreadable storage file");
                Ok((BTreeMap::new(), true))
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let serialized = serde_json::to_vec_pretty(entries)?;
        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        temp.write_all(&serialized)
            .context("failed to write storage temp file")?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let (mut entries, _) = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, path = %self.path.display(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let (mut entries, corrupt) = self.read_for_update()?;
        if entries.remove(key).is_some() || corrupt {
            self.write_all(&entries)?;
            debug!(key, path = %self.path.display(), "Removed value");
        }
        Ok(())
    }
}

/// In-process store, lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`.
    pub fn seeded<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("ownerAuth")?, None);
        store.set("ownerAuth", "true")?;
        store.set("ownerUser", r#"{"name":"Owner"}"#)?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("ownerAuth")?.as_deref(), Some("true"));
        assert_eq!(
            reopened.get("ownerUser")?.as_deref(),
            Some(r#"{"name":"Owner"}"#)
        );

        reopened.remove("ownerAuth")?;
        reopened.remove("ownerAuth")?;
        assert_eq!(store.get("ownerAuth")?, None);
        assert!(store.get("ownerUser")?.is_some());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json")?;

        let store = FileStore::new(&path);
        assert!(store.get("ownerAuth").is_err());

        store.set("ownerAuth", "true")?;
        assert_eq!(store.get("ownerAuth")?.as_deref(), Some("true"));
        Ok(())
    }

    #[test]
    fn remove_clears_a_corrupt_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json")?;

        let store = FileStore::new(&path);
        store.remove("ownerUser")?;
        assert_eq!(store.get("ownerUser")?, None);
        Ok(())
    }

    #[test]
    fn memory_store_behaves_like_a_map() -> Result<()> {
        let store = MemoryStore::seeded([("a", "1")]);
        assert_eq!(store.get("a")?.as_deref(), Some("1"));
        store.set("b", "2")?;
        store.remove("a")?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a")?, None);
        Ok(())
    }
}
