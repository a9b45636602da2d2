//! In-memory TTL cache of computed responses

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// One cached answer
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    /// `None` for answers without a body
    pub payload: Option<serde_json::Value>,
    pub inserted_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl CachedResponse {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_at
    }
}

/// Process-wide response cache with a fixed TTL.
///
/// Keys are compared case-insensitively. Every `put` replaces the entry for
/// its key atomically.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. An expired entry is evicted and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let key = normalize_key(key);
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another writer may have replaced the entry in between
        if entries.get(&key).is_some_and(|entry| entry.is_expired(now)) {
            debug!("Evicting expired response for {}", key);
            entries.remove(&key);
        }
        entries.get(&key).cloned()
    }

    /// Store an answer, overwriting any previous one, and return its expiry
    pub async fn put(
        &self,
        key: &str,
        status: u16,
        payload: Option<serde_json::Value>,
    ) -> DateTime<Utc> {
        let inserted_at = Utc::now();
        let expire_at = TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| inserted_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CachedResponse {
            status,
            payload,
            inserted_at,
            expire_at,
        };

        self.entries.write().await.insert(normalize_key(key), entry);
        expire_at
    }

    pub async fn invalidate(&self, key: &str) {
        let key = normalize_key(key);
        if self.entries.write().await.remove(&key).is_some() {
            debug!("Invalidated cached response for {}", key);
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Run [`Self::sweep`] every `interval` until the handle is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    debug!("Swept {} expired responses", removed);
                }
            }
        })
    }
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}
