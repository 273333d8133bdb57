use crate::common::clock::ClockImpl;
use crate::common::config::{Settings, StorageType};
use crate::storage::{
    file::file_shared_store::FileSharedStore,
    memory::memory_shared_store::MemorySharedStore,
    s3::s3_client::S3Client,
    s3::s3_shared_store::S3SharedStore,
    shared_store_impl::SharedStoreImpl,
};
use anyhow::Result;

pub async fn load_shared_store(settings: &Settings) -> Result<SharedStoreImpl> {
    let store = match &settings.store_type {
        StorageType::File => {
            log::debug!("Using file shared store at {}", settings.shared_root);
            SharedStoreImpl::File(FileSharedStore::new(settings.shared_root.clone()))
        }
        StorageType::S3 => {
            log::debug!("Using S3 shared store");
            let bucket = settings
                .s3_bucket
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3 bucket not configured"))?;
            let prefix = settings.s3_prefix.clone();
            let endpoint = settings
                .s3_endpoint
                .clone()
                .unwrap_or_else(|| "https://s3.amazonaws.com".to_string());
            let access_key = settings
                .s3_access_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3 access key not configured"))?;
            let secret_key = settings
                .s3_secret_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3 secret key not configured"))?;
            let region = settings
                .s3_region
                .clone()
                .unwrap_or_else(|| "us-east-1".to_string());
            let s3_client = S3Client::new(&endpoint, &access_key, &secret_key, &region).await?;
            SharedStoreImpl::S3(S3SharedStore::new(s3_client, bucket, prefix))
        }
        StorageType::Memory => {
            log::debug!("Using in-memory shared store (single-process only)");
            SharedStoreImpl::Memory(MemorySharedStore::new(ClockImpl::System))
        }
    };
    Ok(store)
}
