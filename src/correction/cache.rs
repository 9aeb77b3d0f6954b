/*!
 * Correction result caching.
 *
 * This module provides a memoization cache for correction results to avoid
 * redundant backend calls when the same masked text comes around again.
 * Entries expire after a fixed time-to-live. The cache is owned by the
 * correction service and injectable, so tests can bypass or share it.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use log::debug;
use sha2::{Digest, Sha256};

/// Cache key combining masked text with a backend fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Masked source text
    masked_text: String,

    /// Fingerprint of provider, model and credential
    fingerprint: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(masked_text: &str, fingerprint: &str) -> Self {
        Self {
            masked_text: masked_text.to_string(),
            fingerprint: fingerprint.to_string(),
        }
    }
}

/// A cached correction with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry {
    corrected: String,
    stored_at: Instant,
}

/// Correction cache for storing and retrieving corrected text
pub struct CorrectionCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Time-to-live for entries
    ttl: Duration,

    /// Whether caching is enabled
    enabled: bool,
}

impl CorrectionCache {
    /// Create a new correction cache with the given time-to-live
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            ttl,
            enabled,
        }
    }

    /// Compute the fingerprint that scopes cache entries to one backend.
    /// The credential never leaves the process; only its digest is kept.
    pub fn fingerprint(provider: &str, model: &str, api_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(provider.as_bytes());
        hasher.update(b"/");
        hasher.update(model.as_bytes());
        hasher.update(b"/");
        hasher.update(api_key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get a correction from the cache, ignoring expired entries
    pub fn get(&self, masked_text: &str, fingerprint: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(masked_text, fingerprint);
        let cache = self.cache.read();

        match cache.get(&key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => {
                let mut hits = self.hits.write();
                *hits += 1;

                debug!("Cache hit for '{}'", truncate_text(masked_text, 30));

                Some(entry.corrected.clone())
            },
            _ => {
                let mut misses = self.misses.write();
                *misses += 1;

                debug!("Cache miss for '{}'", truncate_text(masked_text, 30));

                None
            }
        }
    }

    /// Store a correction in the cache
    pub fn store(&self, masked_text: &str, fingerprint: &str, corrected: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(masked_text, fingerprint);
        let mut cache = self.cache.write();

        cache.insert(key, CacheEntry {
            corrected: corrected.to_string(),
            stored_at: Instant::now(),
        });

        debug!("Cached correction for '{}'", truncate_text(masked_text, 30));
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.clear();

        let mut hits = self.hits.write();
        *hits = 0;

        let mut misses = self.misses.write();
        *misses = 0;

        debug!("Correction cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Enable or disable the cache
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for CorrectionCache {
    fn default() -> Self {
        Self::new(true, Duration::from_secs(3600))
    }
}

impl Clone for CorrectionCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            ttl: self.ttl,
            enabled: self.enabled,
        }
    }
}

/// Truncate text to a maximum length with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_length).collect::<String>())
    }
}
