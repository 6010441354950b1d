//! Key-value slots backing the history store.
//!
//! [`FileStore`] keeps one JSON file per key under a data directory and writes
//! atomically (temp file + rename). [`MemoryStore`] keeps everything in a
//! shared map and counts writes, which is what tests and `--ephemeral` use.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::utils::validate_file_size;

/// Synchronous string slot storage, shaped like the browser's `localStorage`
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-per-key storage under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let mut file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()));
            }
        };
        validate_file_size(&file, &path)?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).context("Failed to create data directory")?;
        }

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&temp, value).context("Failed to write temp file")?;
        fs::rename(&temp, &path).context("Failed to rename temp file")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove storage file"),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    writes: usize,
}

/// In-memory storage; clones share the same slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().values.remove(key);
        Ok(())
    }
}
