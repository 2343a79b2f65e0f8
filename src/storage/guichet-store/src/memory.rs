//! In-memory key-value backend.
//!
//! Used by tests and by hosts running in dev mode without a Redis. Honors
//! TTL, absolute expiry, increments, and glob key scans, so code written
//! against [`KvBackend`] behaves the same as against the real store.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::KvBackend;
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<SystemTime>,
}

impl Entry {
    fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// In-memory [`KvBackend`] over a `RwLock`-guarded map.
///
/// Expired entries are pruned lazily on access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = SystemTime::now();
        let mut entries = self.entries.write().await;
        if matches!(entries.get(key), Some(entry) if entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let expires_at = ttl.map(|ttl| SystemTime::now() + ttl);
        let entry = Entry {
            value: value.to_string(),
            expires_at,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let now = SystemTime::now();
        let mut entries = self.entries.write().await;

        if matches!(entries.get(key), Some(entry) if entry.is_expired(now)) {
            entries.remove(key);
        }

        let current = match entries.get(key) {
            Some(entry) => entry
                .value
                .parse::<i64>()
                .map_err(|_| StoreError::InvalidValue(key.to_string()))?,
            None => 0,
        };

        let next = current + 1;
        entries
            .entry(key.to_string())
            .and_modify(|e| e.value = next.to_string())
            .or_insert(Entry {
                value: next.to_string(),
                expires_at: None,
            });

        Ok(next)
    }

    async fn expire_at(&self, key: &str, unix_secs: u64) -> Result<bool, StoreError> {
        let now = SystemTime::now();
        let mut entries = self.entries.write().await;
        if matches!(entries.get(key), Some(entry) if entry.is_expired(now)) {
            entries.remove(key);
        }
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(UNIX_EPOCH + Duration::from_secs(unix_secs));
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let now = SystemTime::now();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Matches `text` against a glob `pattern` supporting `*` and `?`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Backtrack: let the last `*` swallow one more character.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
