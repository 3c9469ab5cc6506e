//! On-disk cache of fetched markup.
//!
//! One JSON file per term, named after the SHA-256 of the term. Expired
//! entries are removed when a read observes them, so no sweep is needed for
//! correctness; [`CacheStore::sweep_expired`] exists for housekeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::errors::{KbbiError, Result};

const CACHE_EXTENSION: &str = "json";

/// A cached page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The looked-up term.
    pub term: String,
    /// Raw markup of the page.
    pub html: String,
    /// When the page was fetched.
    #[serde(rename = "timestamp")]
    pub fetched_at: DateTime<Utc>,
    /// When the entry stops being served.
    #[serde(rename = "expired")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is past its lifetime at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// File count and total size of the cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache files.
    pub files: usize,
    /// Total size in bytes.
    pub bytes: u64,
}

/// Computes the storage key of a term: lowercase hex SHA-256.
#[must_use]
pub fn key_for(term: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(term.as_bytes());
    hex::encode(hasher.finalize())
}

/// TTL-based markup cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfig,
}

impl CacheStore {
    /// Creates a store; the directory is created on first write.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Path of the file backing `term`.
    #[must_use]
    pub fn path_for(&self, term: &str) -> PathBuf {
        self.config
            .dir
            .join(format!("{}.{CACHE_EXTENSION}", key_for(term)))
    }

    /// Returns cached markup for `term`, or `None` on a miss.
    pub fn get(&self, term: &str) -> Option<String> {
        self.get_at(term, Utc::now())
    }

    /// Like [`get`](Self::get) with an explicit clock.
    ///
    /// Unreadable or corrupt files count as misses. An expired entry is
    /// deleted before reporting the miss.
    pub fn get_at(&self, term: &str, now: DateTime<Utc>) -> Option<String> {
        let path = self.path_for(term);
        let entry = read_entry(&path)?;

        if entry.is_expired_at(now) {
            debug!(term, path = %path.display(), "Cache entry expired");
            if let Err(e) = fs::remove_file(&path) {
                warn!(term, error = %e, "Failed to remove expired cache entry");
            }
            return None;
        }

        debug!(term, "Cache hit");
        Some(entry.html)
    }

    /// Stores markup for `term`, replacing any previous entry.
    pub fn put(&self, term: &str, html: &str) -> Result<()> {
        self.put_at(term, html, Utc::now())
    }

    /// Like [`put`](Self::put) with an explicit clock.
    pub fn put_at(&self, term: &str, html: &str, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            term: term.to_string(),
            html: html.to_string(),
            fetched_at: now,
            expires_at: now + self.config.ttl(),
        };
        let data = serde_json::to_vec_pretty(&entry)?;

        fs::create_dir_all(&self.config.dir)?;
        let path = self.path_for(term);

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.config.dir)?;
        tmp.write_all(&data)?;
        tmp.persist(&path)
            .map_err(|e| KbbiError::Cache(format!("cannot persist {}: {e}", path.display())))?;

        debug!(term, path = %path.display(), "Cached page");
        Ok(())
    }

    /// Removes the entry for `term`; a missing entry is not an error.
    pub fn remove(&self, term: &str) -> Result<()> {
        match fs::remove_file(self.path_for(term)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes every expired entry and returns how many were removed.
    ///
    /// Files that cannot be read or decoded are skipped.
    pub fn sweep_expired(&self) -> Result<usize> {
        self.sweep_expired_at(Utc::now())
    }

    /// Like [`sweep_expired`](Self::sweep_expired) with an explicit clock.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for path in self.cache_files()? {
            let Some(entry) = read_entry(&path) else {
                continue;
            };
            if entry.is_expired_at(now) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deletes every cache file and returns how many were removed.
    pub fn purge_all(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.cache_files()? {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Counts cache files and their total size.
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for path in self.cache_files()? {
            if let Ok(meta) = fs::metadata(&path) {
                stats.files += 1;
                stats.bytes += meta.len();
            }
        }
        Ok(stats)
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.config.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(KbbiError::Cache(format!(
                    "cannot read {}: {e}",
                    self.config.dir.display()
                )))
            }
        };

        Ok(entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(CACHE_EXTENSION)
            })
            .collect())
    }
}

fn read_entry(path: &Path) -> Option<CacheEntry> {
    let data = fs::read(path).ok()?;
    match serde_json::from_slice(&data) {
        Ok(entry) => Some(entry),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
            None
        }
    }
}
