use crate::types::{Params, ToolName};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// TTL cache of successful downstream tool results
pub struct ResultCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// SHA-256 over the tool name and its parameters with keys sorted
    pub fn key(tool: ToolName, params: &Params) -> String {
        let canonical: BTreeMap<&String, &Value> = params.iter().collect();
        let mut hasher = Sha256::new();
        hasher.update(tool.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(serde_json::to_string(&canonical).unwrap_or_default().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn get(&self, tool: ToolName, params: &Params) -> Option<Value> {
        let key = Self::key(tool, params);
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    tracing::debug!(tool = %tool, "Result cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(&key);
        tracing::debug!(tool = %tool, "Evicted expired cache entry");
        None
    }

    pub async fn insert(&self, tool: ToolName, params: &Params, value: Value) {
        let key = Self::key(tool, params);
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        if entries.len() < before {
            tracing::debug!(evicted = before - entries.len(), "Evicted expired cache entries");
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_key_ignores_parameter_order() {
        let a = params(json!({ "query": "nhs", "take": 5 }));
        let mut b = Params::new();
        b.insert("take".to_string(), json!(5));
        b.insert("query".to_string(), json!("nhs"));
        assert_eq!(
            ResultCache::key(ToolName::SearchDebates, &a),
            ResultCache::key(ToolName::SearchDebates, &b)
        );
        assert_ne!(
            ResultCache::key(ToolName::SearchDebates, &a),
            ResultCache::key(ToolName::SearchContributions, &a)
        );
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let p = params(json!({ "query": "nhs" }));
        assert!(cache.get(ToolName::SearchDebates, &p).await.is_none());

        cache.insert(ToolName::SearchDebates, &p, json!([1, 2])).await;
        assert_eq!(cache.get(ToolName::SearchDebates, &p).await, Some(json!([1, 2])));
        assert!(cache
            .get(ToolName::SearchDebates, &params(json!({ "query": "tax" })))
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_evicted_on_read() {
        let cache = ResultCache::new(Duration::from_secs(10));
        let p = Params::new();
        cache.insert(ToolName::GetDepartments, &p, json!([])).await;

        tokio::time::advance(Duration::from_secs(11)).await;

        assert!(cache.get(ToolName::GetDepartments, &p).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_entries() {
        let cache = ResultCache::new(Duration::from_secs(10));
        for topic in ["nhs", "tax", "housing"] {
            let p = params(json!({ "query": topic }));
            cache.insert(ToolName::SearchDebates, &p, json!([topic])).await;
        }
        assert_eq!(cache.len().await, 3);

        tokio::time::advance(Duration::from_secs(11)).await;

        let fresh = params(json!({ "query": "schools" }));
        cache.insert(ToolName::SearchDebates, &fresh, json!([])).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(ToolName::SearchDebates, &fresh).await, Some(json!([])));
    }
}
