use crate::storage::file::file_shared_store::FileSharedStore;
use crate::storage::memory::memory_shared_store::MemorySharedStore;
use crate::storage::s3::s3_shared_store::S3SharedStore;
use crate::traits::shared_store::{SharedStore, UnsendSharedStore};
use anyhow::Result;
use serde_json::Value;

pub enum SharedStoreImpl {
    File(FileSharedStore),
    S3(S3SharedStore),
    Memory(MemorySharedStore),
}

impl SharedStore for SharedStoreImpl {
    async fn read(&self, path: &str) -> Result<Option<Value>> {
        match self {
            SharedStoreImpl::File(f) => f.read(path).await,
            SharedStoreImpl::S3(s) => s.read(path).await,
            SharedStoreImpl::Memory(m) => m.read(path).await,
        }
    }

    async fn write(&self, path: &str, doc: &Value) -> Result<()> {
        match self {
            SharedStoreImpl::File(f) => f.write(path, doc).await,
            SharedStoreImpl::S3(s) => s.write(path, doc).await,
            SharedStoreImpl::Memory(m) => m.write(path, doc).await,
        }
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        match self {
            SharedStoreImpl::File(f) => f.list(dir).await,
            SharedStoreImpl::S3(s) => s.list(dir).await,
            SharedStoreImpl::Memory(m) => m.list(dir).await,
        }
    }

    async fn mtime_age(&self, path: &str) -> Result<Option<f64>> {
        match self {
            SharedStoreImpl::File(f) => f.mtime_age(path).await,
            SharedStoreImpl::S3(s) => s.mtime_age(path).await,
            SharedStoreImpl::Memory(m) => m.mtime_age(path).await,
        }
    }
}

/// The one non-atomic read-modify-write against the shared store: read a
/// whole-file JSON array (absent or malformed reads as empty), push one
/// element, write the whole file back.
///
/// Two uncoordinated writers racing here can clobber each other's append;
/// that is the accepted last-writer-wins tradeoff of the shared-folder
/// transport. Any future conditional-write strategy replaces this function
/// without touching call sites.
pub async fn append_json_array(store: &SharedStoreImpl, path: &str, element: Value) -> Result<()> {
    let mut items: Vec<Value> = match SharedStore::read(store, path).await? {
        Some(doc) => serde_json::from_value(doc).unwrap_or_else(|e| {
            log::warn!("malformed array at {}, resetting: {}", path, e);
            Vec::new()
        }),
        None => Vec::new(),
    };
    items.push(element);
    SharedStore::write(store, path, &Value::Array(items)).await
}
