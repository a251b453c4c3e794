//! Per-run caching of file contents, existence checks and git query results.
//!
//! A [`ValidationCache`] belongs to one [`crate::validator::Validator`] and so
//! to one validation run. Clones share the same storage, which lets an
//! external watcher hold a handle and call [`ValidationCache::clear`] when
//! files change. Failed computations are never cached.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::version::VersionRef;

#[derive(Debug, Default)]
struct CacheState {
    contents: HashMap<PathBuf, String>,
    files: HashMap<PathBuf, bool>,
    refs: HashMap<(PathBuf, VersionRef), bool>,
    objects: HashMap<(PathBuf, String), bool>,
    roots: HashMap<PathBuf, Option<PathBuf>>,
}

impl CacheState {
    fn contents(&mut self) -> &mut HashMap<PathBuf, String> {
        &mut self.contents
    }

    fn files(&mut self) -> &mut HashMap<PathBuf, bool> {
        &mut self.files
    }

    fn refs(&mut self) -> &mut HashMap<(PathBuf, VersionRef), bool> {
        &mut self.refs
    }

    fn objects(&mut self) -> &mut HashMap<(PathBuf, String), bool> {
        &mut self.objects
    }

    fn roots(&mut self) -> &mut HashMap<PathBuf, Option<PathBuf>> {
        &mut self.roots
    }

    fn len(&self) -> usize {
        self.contents.len() + self.files.len() + self.refs.len() + self.objects.len() + self.roots.len()
    }
}

/// Cache scoped to a validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationCache {
    state: Arc<Mutex<CacheState>>,
}

impl ValidationCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>> {
        self.state.lock().map_err(|_| Error::LockPoisoned {
            context: "validation cache".to_string(),
        })
    }

    /// Look up `key` in the selected map, or compute and store it.
    fn get_or_compute<K, V, S, F>(&self, select: S, key: K, compute: F) -> Result<V>
    where
        K: Eq + Hash,
        V: Clone,
        S: Fn(&mut CacheState) -> &mut HashMap<K, V>,
        F: FnOnce() -> Result<V>,
    {
        {
            let mut state = self.lock()?;
            if let Some(cached) = select(&mut *state).get(&key) {
                return Ok(cached.clone());
            }
        }

        // Computed outside the lock; a concurrent miss may compute twice
        let value = compute()?;

        let mut state = self.lock()?;
        select(&mut *state).insert(key, value.clone());
        Ok(value)
    }

    /// Read a file's text, once per run.
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        self.get_or_compute(CacheState::contents, path.to_path_buf(), || {
            std::fs::read_to_string(path).map_err(Error::Io)
        })
    }

    /// Whether a file exists on disk, once per run.
    pub fn file_exists(&self, path: &Path) -> Result<bool> {
        self.get_or_compute(CacheState::files, path.to_path_buf(), || Ok(path.is_file()))
    }

    /// Memoize a ref-existence answer for a repository.
    pub fn ref_exists<F>(&self, repo: &Path, version: &VersionRef, compute: F) -> Result<bool>
    where
        F: FnOnce() -> bool,
    {
        let key = (repo.to_path_buf(), version.clone());
        self.get_or_compute(CacheState::refs, key, || Ok(compute()))
    }

    /// Memoize an object-existence answer (`<ref>:<path>`) for a repository.
    pub fn object_exists<F>(&self, repo: &Path, object: &str, compute: F) -> Result<bool>
    where
        F: FnOnce() -> bool,
    {
        let key = (repo.to_path_buf(), object.to_string());
        self.get_or_compute(CacheState::objects, key, || Ok(compute()))
    }

    /// Memoize the working-copy root of a directory (`None` when lookup failed).
    pub fn repository_root<F>(&self, dir: &Path, compute: F) -> Result<Option<PathBuf>>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        self.get_or_compute(CacheState::roots, dir.to_path_buf(), || Ok(compute()))
    }

    /// Drop every cached entry.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        *state = CacheState::default();
        Ok(())
    }

    /// Get the number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
