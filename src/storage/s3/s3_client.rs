use aws_config::Region;
use aws_sdk_s3::{config::{Credentials, SharedCredentialsProvider}, primitives::ByteStream, Client};
use bytes::Bytes;
use anyhow::Result;

pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub async fn new(endpoint: &str, access_key: &str, secret_key: &str, region: &str) -> Result<Self> {
        log::info!("Creating S3 client with endpoint: {}, region: {}", endpoint, region);
        let credentials = Credentials::new(access_key.to_string(), secret_key.to_string(), None, None, "custom");
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version_latest()
            .region(Region::new(region.to_string()))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .force_path_style(true)
            .endpoint_url(endpoint.to_string())
            .build();
        let client = Client::from_conf(config);
        Ok(S3Client { client })
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        let output = self.client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;
        match output {
            Ok(output) => {
                let data = output.body.collect().await?.into_bytes();
                Ok(Some(data))
            }
            Err(e) if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }

    /// Seconds since the object was last rewritten, from the HEAD metadata.
    pub async fn object_age_seconds(&self, bucket: &str, key: &str) -> Result<Option<f64>> {
        let output = self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;
        match output {
            Ok(output) => {
                let modified = output
                    .last_modified()
                    .ok_or_else(|| anyhow::anyhow!("LastModified not found in response"))?;
                let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
                let age = (now - modified.as_secs_f64()).max(0.0);
                Ok(Some(age))
            }
            Err(e) if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Immediate children of `prefix`, with the prefix and any trailing
    /// delimiter stripped.
    pub async fn list_children(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let output = self.client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .delimiter("/")
            .send()
            .await?;

        let mut names = Vec::new();
        for common in output.common_prefixes() {
            if let Some(p) = common.prefix() {
                let name = p.trim_start_matches(prefix).trim_end_matches('/');
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        for object in output.contents() {
            if let Some(k) = object.key() {
                let name = k.trim_start_matches(prefix);
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
