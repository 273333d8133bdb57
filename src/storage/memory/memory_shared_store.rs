use crate::common::clock::ClockImpl;
use crate::traits::shared_store::UnsendSharedStore;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

struct Entry {
    doc: Value,
    mtime_ms: i64,
}

/// Deterministic in-memory fake of the shared folder. Drives the drain,
/// forward and consolidation logic in tests without real I/O; document ages
/// follow the injected clock and can be backdated explicitly.
pub struct MemorySharedStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: ClockImpl,
}

impl MemorySharedStore {
    pub fn new(clock: ClockImpl) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Rewinds a document's mtime, as if it had not been rewritten for
    /// `seconds`.
    pub async fn backdate(&self, path: &str, seconds: f64) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(path) {
            entry.mtime_ms = self.clock.now_ms() - (seconds * 1000.0) as i64;
        }
    }

    pub async fn remove(&self, path: &str) {
        self.entries.lock().await.remove(path);
    }
}

impl UnsendSharedStore for MemorySharedStore {
    async fn read(&self, path: &str) -> Result<Option<Value>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(path).map(|e| e.doc.clone()))
    }

    async fn write(&self, path: &str, doc: &Value) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            path.to_string(),
            Entry {
                doc: doc.clone(),
                mtime_ms: self.clock.now_ms(),
            },
        );
        Ok(())
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().await;
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir.trim_end_matches('/'))
        };
        let mut names: Vec<String> = entries
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|rest| match rest.split_once('/') {
                Some((child, _)) => child.to_string(),
                None => rest.to_string(),
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn mtime_age(&self, path: &str) -> Result<Option<f64>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(path)
            .map(|e| ((self.clock.now_ms() - e.mtime_ms).max(0) as f64) / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::shared_store::SharedStore;
    use serde_json::json;

    #[tokio::test]
    async fn age_tracks_the_injected_clock() {
        let clock = ClockImpl::manual(0);
        let store = MemorySharedStore::new(clock.clone());
        store.write("NODE_A/status.json", &json!({})).await.unwrap();
        assert_eq!(store.mtime_age("NODE_A/status.json").await.unwrap(), Some(0.0));
        clock.advance_ms(45_000);
        assert_eq!(store.mtime_age("NODE_A/status.json").await.unwrap(), Some(45.0));
    }

    #[tokio::test]
    async fn backdate_rewinds_mtime_only() {
        let store = MemorySharedStore::new(ClockImpl::manual(1_000_000));
        store.write("NODE_C/status.json", &json!({"x": 1})).await.unwrap();
        store.backdate("NODE_C/status.json", 200.0).await;
        assert_eq!(store.mtime_age("NODE_C/status.json").await.unwrap(), Some(200.0));
        assert_eq!(
            store.read("NODE_C/status.json").await.unwrap(),
            Some(json!({"x": 1}))
        );
    }

    #[tokio::test]
    async fn list_returns_immediate_children() {
        let store = MemorySharedStore::new(ClockImpl::manual(0));
        store.write("NODE_A/status.json", &json!({})).await.unwrap();
        store.write("NODE_B/status.json", &json!({})).await.unwrap();
        store.write("MASTER/health_report.json", &json!({})).await.unwrap();
        assert_eq!(store.list("").await.unwrap(), vec!["MASTER", "NODE_A", "NODE_B"]);
        assert_eq!(store.list("NODE_A").await.unwrap(), vec!["status.json"]);
    }
}
