use crate::traits::shared_store::UnsendSharedStore;
use anyhow::Result;
use serde_json::Value;
use std::fs::{create_dir_all, rename, File};
use std::io::{
    BufReader,
    ErrorKind::NotFound,
    Read,
    Write,
};
use std::path::PathBuf;
use std::time::SystemTime;

/// Shared store backed by a plain directory, typically a folder kept in sync
/// by an external file-sync service. The sync service is the transport; this
/// store only reads and rewrites whole JSON files under the root.
pub struct FileSharedStore {
    root: PathBuf,
}

impl FileSharedStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl UnsendSharedStore for FileSharedStore {
    async fn read(&self, path: &str) -> Result<Option<Value>> {
        let file = match File::open(self.resolve(path)) {
            Ok(f) => f,
            Err(e) if e.kind() == NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut contents = String::new();
        BufReader::new(file).read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            // A writer on another machine may have been interrupted mid-sync.
            log::warn!("shared file is empty: {}", path);
            return Ok(None);
        }
        let doc = serde_json::from_str(&contents)?;
        Ok(Some(doc))
    }

    async fn write(&self, path: &str, doc: &Value) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }
        // Write-then-rename so a concurrent reader never observes a torn file.
        let tmp = target.with_extension("tmp");
        let json = serde_json::to_string_pretty(doc)?;
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        rename(&tmp, &target)?;
        Ok(())
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let target = if dir.is_empty() {
            self.root.clone()
        } else {
            self.resolve(dir)
        };
        let entries = match std::fs::read_dir(&target) {
            Ok(entries) => entries,
            Err(e) if e.kind() == NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    async fn mtime_age(&self, path: &str) -> Result<Option<f64>> {
        let metadata = match std::fs::metadata(self.resolve(path)) {
            Ok(m) => m,
            Err(e) if e.kind() == NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modified = metadata.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0); // clock skew across machines can put mtime in the future
        Ok(Some(age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::shared_store::SharedStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSharedStore::new(dir.path());
        assert!(store.read("NODE_A/status.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_creates_parents_and_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileSharedStore::new(dir.path());
        let doc = json!({"nodeId": "A", "timestamp": 1});
        store.write("NODE_A/status.json", &doc).await.unwrap();
        let read_back = store.read("NODE_A/status.json").await.unwrap().unwrap();
        assert_eq!(read_back, doc);
    }

    #[tokio::test]
    async fn write_replaces_whole_document() {
        let dir = TempDir::new().unwrap();
        let store = FileSharedStore::new(dir.path());
        store.write("MASTER/x.json", &json!([1, 2, 3])).await.unwrap();
        store.write("MASTER/x.json", &json!([])).await.unwrap();
        assert_eq!(store.read("MASTER/x.json").await.unwrap().unwrap(), json!([]));
    }

    #[tokio::test]
    async fn empty_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("NODE_B")).unwrap();
        std::fs::write(dir.path().join("NODE_B/status.json"), "").unwrap();
        let store = FileSharedStore::new(dir.path());
        assert!(store.read("NODE_B/status.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_sorted_entries_and_empty_for_missing_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileSharedStore::new(dir.path());
        store.write("NODE_B/status.json", &json!({})).await.unwrap();
        store.write("NODE_A/status.json", &json!({})).await.unwrap();
        assert_eq!(store.list("").await.unwrap(), vec!["NODE_A", "NODE_B"]);
        assert!(store.list("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mtime_age_is_small_for_fresh_write_and_none_for_missing() {
        let dir = TempDir::new().unwrap();
        let store = FileSharedStore::new(dir.path());
        store.write("NODE_A/status.json", &json!({})).await.unwrap();
        let age = store.mtime_age("NODE_A/status.json").await.unwrap().unwrap();
        assert!(age < 5.0);
        assert!(store.mtime_age("NODE_C/status.json").await.unwrap().is_none());
    }
}
