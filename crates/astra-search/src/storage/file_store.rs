use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStore;

/// String values kept in a single JSON object on disk.
///
/// Every call re-reads the file, so edits made by another process between calls
/// are picked up. Writes go through a temp file and a rename.
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

    fn read_content(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file {}", self.path.display()))?;
        Ok((!content.trim().is_empty()).then_some(content))
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let Some(content) = self.read_content()? else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store file {}", self.path.display()))
    }

    /// Like [`load`](Self::load), but an unparsable file is moved aside to
    /// `*.json.corrupt` and replaced by an empty map, so the write can go through.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>> {
        let Some(content) = self.read_content()? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&content) {
            Ok(values) => Ok(values),
            Err(e) => {
                let aside = self.corrupt_path();
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Store file is corrupt, starting from an empty store"
                );
                fs::rename(&self.path, &aside).with_context(|| {
                    format!("Failed to move corrupt store file to {}", aside.display())
                })?;
                Ok(BTreeMap::new())
            }
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let content = serde_json::to_string_pretty(values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write store file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace store file {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), keys = values.len(), "Store saved");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut values = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut values = self.load_for_write()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}
