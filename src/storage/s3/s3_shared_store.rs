use crate::storage::s3::s3_client::S3Client;
use crate::traits::shared_store::UnsendSharedStore;
use anyhow::Result;
use serde_json::Value;

/// Shared store backed by an S3-compatible bucket. Used when the shared
/// folder is an object store rather than a synced directory; the path keys
/// are the same as for the filesystem backend, under an optional prefix.
pub struct S3SharedStore {
    s3_client: S3Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3SharedStore {
    pub fn new(s3_client: S3Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            s3_client,
            bucket,
            prefix,
        }
    }

    fn key(&self, path: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, path),
            None => path.to_string(),
        }
    }
}

impl UnsendSharedStore for S3SharedStore {
    async fn read(&self, path: &str) -> Result<Option<Value>> {
        let data = match self.s3_client.get_object(&self.bucket, &self.key(path)).await? {
            Some(data) => data,
            None => return Ok(None),
        };
        if data.is_empty() {
            log::warn!("shared object is empty: {}", path);
            return Ok(None);
        }
        let doc = serde_json::from_slice(&data)?;
        Ok(Some(doc))
    }

    async fn write(&self, path: &str, doc: &Value) -> Result<()> {
        let json = serde_json::to_vec_pretty(doc)?;
        self.s3_client.put_object(&self.bucket, &self.key(path), json).await
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let prefix = if dir.is_empty() {
            self.key("")
        } else {
            format!("{}/", self.key(dir.trim_end_matches('/')))
        };
        self.s3_client.list_children(&self.bucket, &prefix).await
    }

    async fn mtime_age(&self, path: &str) -> Result<Option<f64>> {
        self.s3_client.object_age_seconds(&self.bucket, &self.key(path)).await
    }
}
