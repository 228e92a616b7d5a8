//! Cache store persisting entries as JSON files on disk
//!
//! Each key maps to `<cache_dir>/<key>.json`. Keys are produced by
//! [`fingerprint`](super::fingerprint) or are fixed names, so they are always
//! filename safe. Keys too long for a file name are stored under their
//! SHA-256 digest instead, with the full key kept in the file.

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

use super::store::{CacheEntry, CacheError, CacheStore, CachedData};
use crate::clock::{Clock, SystemClock};

/// Longest key used verbatim as a file stem; leaves room under the usual
/// 255 byte name limit for the extension and temp file suffixes
const MAX_PLAIN_KEY_LEN: usize = 160;

/// On-disk form of an entry
#[derive(Serialize)]
struct StoredEntry<'a> {
    key: &'a str,
    #[serde(flatten)]
    entry: CacheEntry<&'a Value>,
}

#[derive(Deserialize)]
struct LoadedEntry {
    /// Absent in files written before keys were recorded
    #[serde(default)]
    key: Option<String>,
    #[serde(flatten)]
    entry: CacheEntry<Value>,
}

fn file_stem(key: &str) -> String {
    if key.len() <= MAX_PLAIN_KEY_LEN {
        key.to_string()
    } else {
        format!("sha256_{:x}", Sha256::digest(key.as_bytes()))
    }
}

/// Reads and writes cache entries under an XDG-compliant cache directory
///
/// Uses `~/.cache/holli/` on Linux. Unreadable files are treated as misses.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Creates a FileCache in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("com", "talpaq", "holli")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a FileCache with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", file_stem(key)))
    }
}

impl CacheStore for FileCache {
    fn read(&self, key: &str) -> Option<CachedData<Value>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        match serde_json::from_str::<LoadedEntry>(&content) {
            Ok(LoadedEntry {
                key: Some(stored), ..
            }) if stored != key => {
                debug!(key, "cache file belongs to another key");
                None
            }
            Ok(loaded) => Some(loaded.entry.into_cached(self.clock.now())),
            Err(e) => {
                debug!(key, error = %e, "ignoring unreadable cache file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir)?;

        let stored = StoredEntry {
            key,
            entry: CacheEntry::new(value, self.clock.now(), ttl),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        // Readers see either the old file or the new one, never a partial write
        let mut file = NamedTempFile::new_in(&self.cache_dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(self.cache_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
