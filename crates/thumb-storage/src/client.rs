//! S3-compatible storage client implementation.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the object-storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Optional S3-compatible endpoint URL; unset means plain AWS
    pub endpoint_url: Option<String>,
    /// Static access key; unset falls back to the ambient provider chain
    pub access_key_id: Option<String>,
    /// Static secret key
    pub secret_access_key: Option<String>,
    /// Region used before a bucket location has been resolved
    pub region: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let access_key_id = std::env::var("STORAGE_ACCESS_KEY_ID").ok();
        let secret_access_key = std::env::var("STORAGE_SECRET_ACCESS_KEY").ok();

        if access_key_id.is_some() != secret_access_key.is_some() {
            return Err(StorageError::config_error(
                "STORAGE_ACCESS_KEY_ID and STORAGE_SECRET_ACCESS_KEY must be set together",
            ));
        }

        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL").ok(),
            access_key_id,
            secret_access_key,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}

/// S3-compatible object storage client.
#[derive(Clone)]
pub struct ObjectStoreClient {
    client: Client,
    config: StorageConfig,
}

impl ObjectStoreClient {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let client = build_client(&config, &config.region);
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(StorageConfig::from_env()?)
    }

    /// Resolve the region a bucket lives in.
    ///
    /// Buckets in the legacy default region report an empty location
    /// constraint, which maps back to the configured default region.
    pub async fn bucket_region(&self, bucket: &str) -> StorageResult<String> {
        let response = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageError::LocationFailed(e.to_string()))?;

        let constraint = response
            .location_constraint()
            .map(|c| c.as_str().to_string())
            .filter(|c| !c.is_empty());

        Ok(constraint.unwrap_or_else(|| self.config.region.clone()))
    }

    /// Rebuild the client against a specific region.
    pub fn for_region(&self, region: &str) -> Self {
        Self {
            client: build_client(&self.config, region),
            config: self.config.clone(),
        }
    }

    /// Fetch the size of an object in bytes.
    pub async fn object_size(&self, bucket: &str, key: &str) -> StorageResult<u64> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NotFound") {
                    StorageError::not_found(key)
                } else {
                    StorageError::MetadataFailed(e.to_string())
                }
            })?;

        Ok(response.content_length().unwrap_or(0) as u64)
    }

    /// Stream an object into a local file, optionally only a byte range.
    ///
    /// The parent directory is created when missing.
    pub async fn download_to_file(
        &self,
        bucket: &str,
        key: &str,
        path: impl AsRef<Path>,
        range: Option<&str>,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Downloading {} to {}", key, path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::DownloadFailed(format!("Failed to create directory: {}", e))
            })?;
        }

        let mut request = self.client.get_object().bucket(bucket).key(key);
        if let Some(r) = range {
            request = request.range(r);
        }

        let response = request.send().await.map_err(|e| {
            if e.to_string().contains("NoSuchKey") {
                StorageError::not_found(key)
            } else {
                StorageError::DownloadFailed(e.to_string())
            }
        })?;

        let mut body = response.body;
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Failed to create file: {}", e)))?;

        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| StorageError::DownloadFailed(format!("Failed to write file: {}", e)))?;
        }

        file.flush()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Failed to flush file: {}", e)))?;

        info!("Downloaded {} to {}", key, path.display());
        Ok(())
    }
}

/// Range header covering the first `bytes` bytes of an object.
pub fn leading_range(bytes: u64) -> String {
    format!("bytes=0-{}", bytes)
}

fn build_client(config: &StorageConfig, region: &str) -> Client {
    let mut builder = Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(region.to_string()));

    if let Some(endpoint) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        builder = builder.credentials_provider(Credentials::new(key, secret, None, None, "thumbgen"));
    }

    Client::from_conf(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_range() {
        assert_eq!(leading_range(102400), "bytes=0-102400");
    }

    #[test]
    fn test_for_region_keeps_config() {
        let config = StorageConfig {
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            region: "us-east-1".to_string(),
        };
        let client = ObjectStoreClient::new(config).unwrap();
        let rebound = client.for_region("eu-west-2");
        assert_eq!(rebound.config.region, "us-east-1");
    }
}
