//! Parsed document cache.
//!
//! Documents are keyed by file path and revalidated by a content hash of
//! the text supplied on each call, so edits, undo and external writes are
//! all picked up without invalidation signals. Entries idle for longer
//! than the TTL are dropped.

use crate::config::CacheOptions;
use crate::json::{JsonDocument, JsonParser, ParseError, RangedJsonParser};
use pkgref_util::hash::content_hash;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Source of parsed documents for the query entry points.
pub trait DocumentCache: Send + Sync {
    /// Parse `text` (the current contents of `path`), or return a cached parse of it.
    ///
    /// # Errors
    /// Returns the parser's error for malformed JSON.
    fn document(&self, path: &Path, text: &str) -> Result<Arc<JsonDocument>, ParseError>;
}

/// No caching: every call parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocumentCache;

impl DocumentCache for NoDocumentCache {
    fn document(&self, _path: &Path, text: &str) -> Result<Arc<JsonDocument>, ParseError> {
        RangedJsonParser.parse(text).map(Arc::new)
    }
}

#[derive(Debug)]
struct CacheEntry {
    doc: Arc<JsonDocument>,
    content_hash: String,
    /// Milliseconds since the cache's epoch.
    last_access_ms: AtomicU64,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Documents currently held.
    pub entries: usize,
    /// Parser invocations (successful or not).
    pub parses: u64,
    /// Calls answered without parsing.
    pub hits: u64,
}

/// Content-hash-gated document cache with idle-time eviction.
///
/// Safe to share between threads. Two callers racing on the same stale
/// entry may both parse; the results are identical and the last insert
/// wins.
#[derive(Debug)]
pub struct ParseCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    parser: Box<dyn JsonParser>,
    ttl: Duration,
    epoch: Instant,
    parses: AtomicU64,
    hits: AtomicU64,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::from_options(CacheOptions::default())
    }
}

impl ParseCache {
    /// Create an empty cache with the given idle TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            parser: Box::new(RangedJsonParser),
            ttl,
            epoch: Instant::now(),
            parses: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_options(options: CacheOptions) -> Self {
        Self::new(options.ttl())
    }

    /// Use a different parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn JsonParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Idle time after which an entry is dropped.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the document for `text`, parsing only when `path` has no
    /// live entry or its stored hash differs.
    ///
    /// A parse failure leaves any existing entry untouched, so a transient
    /// invalid edit does not evict the last good document.
    ///
    /// # Errors
    /// Returns the parser's error for malformed JSON.
    pub fn get_ast(&self, path: &Path, text: &str) -> Result<Arc<JsonDocument>, ParseError> {
        let hash = content_hash(text);
        let now = self.now_ms();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(path) {
                if entry.content_hash == hash && !self.is_expired(entry, now) {
                    entry.last_access_ms.store(now, Ordering::Relaxed);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(path = %path.display(), "parse cache hit");
                    return Ok(Arc::clone(&entry.doc));
                }
            }
        }

        let start = Instant::now();
        self.parses.fetch_add(1, Ordering::Relaxed);
        let doc = match self.parser.parse(text) {
            Ok(doc) => Arc::new(doc),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "parse failed, keeping cached entry");
                return Err(e);
            }
        };
        debug!(
            path = %path.display(),
            nodes = doc.len(),
            elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "parsed document"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| !self.is_expired(entry, now));
        entries.insert(
            path.to_path_buf(),
            CacheEntry {
                doc: Arc::clone(&doc),
                content_hash: hash,
                last_access_ms: AtomicU64::new(now),
            },
        );

        Ok(doc)
    }

    /// Drop entries idle for longer than the TTL.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.now_ms();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(count = removed, "evicted idle documents");
        }
        removed
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(path).is_some()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            entries: entries.len(),
            parses: self.parses.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn is_expired(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        let idle = now_ms.saturating_sub(entry.last_access_ms.load(Ordering::Relaxed));
        u128::from(idle) >= self.ttl.as_millis()
    }
}

impl DocumentCache for ParseCache {
    fn document(&self, path: &Path, text: &str) -> Result<Arc<JsonDocument>, ParseError> {
        self.get_ast(path, text)
    }
}
