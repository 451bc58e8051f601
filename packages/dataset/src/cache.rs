//! Checksum-keyed cache of loaded datasets.
//!
//! Repeated interactions against the same source must not re-parse the
//! file, but the cache only ever hands out immutable [`Arc`] snapshots —
//! no writer mutates a cached dataset in place. Entries are keyed by the
//! SHA-256 of the source bytes, so editing the file under the same path
//! invalidates the entry on the next load.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest as _, Sha256};

use crate::{Dataset, LoadError};

/// Explicit dataset cache owned by the loader layer.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: BTreeMap<String, CachedEntry>,
}

#[derive(Debug)]
struct CachedEntry {
    checksum: String,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Loads the dataset at `path`, returning the cached snapshot when
    /// the file content has not changed since the previous load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file is unreadable or fails to parse.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let bytes = std::fs::read(path)?;
        let checksum = hex::encode(Sha256::digest(&bytes));
        let key = path.display().to_string();

        if let Some(entry) = self.entries.get(&key)
            && entry.checksum == checksum
        {
            log::debug!("Dataset cache hit for {key} ({checksum})");
            return Ok(Arc::clone(&entry.dataset));
        }

        log::debug!("Dataset cache miss for {key}; parsing");
        let dataset = Arc::new(Dataset::from_reader(bytes.as_slice())?);
        self.entries.insert(
            key,
            CachedEntry {
                checksum,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Number of cached snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
