use anyhow::Result;
use serde_json::Value;

/// The shared transport: JSON documents in an eventually-consistent folder,
/// keyed by store-relative paths like `NODE_A/status.json`.
///
/// Writes replace the whole document (last-writer-wins at the file level);
/// there is no locking or compare-and-swap across nodes. A missing document
/// is `Ok(None)`, never an error: it means "not yet published".
#[trait_variant::make(SharedStore: Send)]
pub trait UnsendSharedStore {
    async fn read(&self, path: &str) -> Result<Option<Value>>;
    async fn write(&self, path: &str, doc: &Value) -> Result<()>;
    async fn list(&self, dir: &str) -> Result<Vec<String>>;
    /// Age of the document's last rewrite in seconds. The sole liveness signal.
    async fn mtime_age(&self, path: &str) -> Result<Option<f64>>;
}
