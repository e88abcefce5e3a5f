//! Object store client implementation.

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the object store client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region (usually "us-east-1" for MinIO)
    pub region: String,
    /// Private bucket holding raw uploads
    pub raw_bucket: String,
    /// Public-read bucket holding transcoded assets
    pub public_bucket: String,
    /// Base URL prefixed to public object keys when building playback URLs
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let endpoint_url = std::env::var("OBJECT_STORE_ENDPOINT")
            .map_err(|_| StorageError::config_error("OBJECT_STORE_ENDPOINT not set"))?;
        Ok(Self {
            public_base_url: std::env::var("OBJECT_STORE_PUBLIC_URL")
                .unwrap_or_else(|_| endpoint_url.clone()),
            endpoint_url,
            access_key_id: std::env::var("OBJECT_STORE_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_ACCESS_KEY not set"))?,
            secret_access_key: std::env::var("OBJECT_STORE_SECRET_KEY")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_SECRET_KEY not set"))?,
            region: std::env::var("OBJECT_STORE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            raw_bucket: std::env::var("OBJECT_STORE_RAW_BUCKET")
                .unwrap_or_else(|_| "raw-videos".to_string()),
            public_bucket: std::env::var("OBJECT_STORE_PUBLIC_BUCKET")
                .unwrap_or_else(|_| "public-videos".to_string()),
        })
    }
}

/// Long-lived, process-wide object store handle.
///
/// Holds no per-request state; clone freely.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    raw_bucket: String,
    public_bucket: String,
    public_base_url: String,
}

impl ObjectStore {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vshare",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            raw_bucket: config.raw_bucket,
            public_bucket: config.public_bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(StorageConfig::from_env()?))
    }

    pub fn raw_bucket(&self) -> &str {
        &self.raw_bucket
    }

    pub fn public_bucket(&self) -> &str {
        &self.public_bucket
    }

    /// Upload raw bytes to the private bucket, bounded by `timeout`.
    pub async fn put_raw(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        timeout: Duration,
    ) -> StorageResult<()> {
        self.put_object(self.raw_bucket.clone(), key, ByteStream::from(data), content_type, timeout)
            .await
    }

    /// Upload a local file to the public-read bucket.
    pub async fn put_public_file(
        &self,
        key: &str,
        path: impl AsRef<Path>,
        content_type: &str,
        timeout: Duration,
    ) -> StorageResult<()> {
        let body = ByteStream::from_path(path.as_ref())
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;
        self.put_object(self.public_bucket.clone(), key, body, content_type, timeout)
            .await
    }

    async fn put_object(
        &self,
        bucket: String,
        key: &str,
        body: ByteStream,
        content_type: &str,
        timeout: Duration,
    ) -> StorageResult<()> {
        debug!("Uploading {} to bucket {}", key, bucket);

        let fut = self
            .client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send();

        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(timeout.as_secs()))?
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to bucket {}", key, bucket);
        Ok(())
    }

    /// Download an object from the private bucket to a local file,
    /// bounded by `timeout`.
    pub async fn download_raw_to_file(
        &self,
        key: &str,
        path: impl AsRef<Path>,
        timeout: Duration,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Downloading {} to {}", key, path.display());

        let fut = self
            .client
            .get_object()
            .bucket(&self.raw_bucket)
            .key(key)
            .send();

        let response = tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(timeout.as_secs()))?
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::not_found(key)
                } else {
                    StorageError::download_failed(e.to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;

        info!("Downloaded {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    /// Public URL for an object in the public-read bucket.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.public_bucket, key)
    }

    /// Check connectivity by heading the raw bucket.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.raw_bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("connectivity check failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ObjectStore {
        ObjectStore::new(StorageConfig {
            endpoint_url: "http://localhost:9000".to_string(),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
            region: "us-east-1".to_string(),
            raw_bucket: "raw-videos".to_string(),
            public_bucket: "public-videos".to_string(),
            public_base_url: "http://localhost:9000/".to_string(),
        })
    }

    #[test]
    fn test_public_url_shape() {
        let s = store();
        assert_eq!(
            s.public_url("videos/7/video.mp4"),
            "http://localhost:9000/public-videos/videos/7/video.mp4"
        );
    }
}
