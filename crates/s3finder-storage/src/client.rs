//! S3 client implementation.

use std::path::Path;
use std::time::Duration;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::{StorageConfig, FALLBACK_REGION};
use crate::error::{StorageError, StorageResult};
use crate::key::ObjectKey;

const CREDENTIALS_PROVIDER_NAME: &str = "s3finder";

/// A presigned download URL.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    /// The URL, including the signature query parameters
    pub url: String,
    /// Taken before signing, so never later than the real expiry
    pub expires_at: DateTime<Utc>,
    /// Lifetime requested from the signer
    pub expires_in_secs: u64,
}

/// Authenticated S3 client bound to one bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    bucket: String,
}

impl StorageClient {
    /// Build an authenticated client.
    ///
    /// Static credentials are used when both key and secret are configured;
    /// otherwise the SDK default provider chain is consulted and credentials
    /// are resolved immediately, so a missing identity fails here rather than
    /// on the first request.
    pub async fn authenticate(config: &StorageConfig) -> StorageResult<Self> {
        if config.has_partial_credentials() {
            let missing = if config.access_key_id.is_some() {
                "secret access key is missing"
            } else {
                "access key id is missing"
            };
            return Err(StorageError::partial_credentials(missing));
        }

        let region = resolve_region(config).await;

        let builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials = Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                );
                Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            _ => {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;

                let provider = sdk_config
                    .credentials_provider()
                    .ok_or_else(|| {
                        StorageError::no_credentials("no credentials provider available")
                    })?;
                provider.provide_credentials().await.map_err(|e| {
                    StorageError::no_credentials(DisplayErrorContext(&e).to_string())
                })?;

                Builder::from(&sdk_config)
            }
        };

        let mut builder = builder
            .force_path_style(config.force_path_style)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        debug!(bucket = %config.bucket, "Storage client authenticated");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }

    /// Check if an object exists (metadata probe, no data transfer).
    ///
    /// Returns `Ok(false)` only for the backend's not-found answer. Any other
    /// failure (permission denied, 5xx, transport) is an error.
    pub async fn exists(&self, key: &ObjectKey) -> StorageResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(err)) => {
                let status = err.raw().status().as_u16();
                let service_err = err.err();
                let not_found = service_err.is_not_found()
                    || service_err.code() == Some("NoSuchKey")
                    || status == 404;
                if not_found {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(format!(
                        "HeadObject failed with status {}: {}",
                        status,
                        DisplayErrorContext(service_err)
                    )))
                }
            }
            Err(e) => Err(StorageError::AwsSdk(DisplayErrorContext(&e).to_string())),
        }
    }

    /// Generate a presigned GET URL that forces a download named after the key.
    pub async fn presign_download(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;
        let lifetime = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;
        let expires_at = Utc::now() + lifetime;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .response_content_disposition(key.content_disposition())
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at,
            expires_in_secs: expires_in.as_secs(),
        })
    }

    /// Download an object to a local file if it exists.
    ///
    /// Returns the number of bytes written.
    pub async fn download_file(
        &self,
        key: &ObjectKey,
        path: impl AsRef<Path>,
    ) -> StorageResult<u64> {
        let path = path.as_ref();

        if !self.exists(key).await? {
            return Err(StorageError::not_found(key.as_str()));
        }

        debug!("Downloading {} to {}", key, path.display());

        let mut response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(DisplayErrorContext(&e).to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(path).await?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .body
            .try_next()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!("Downloaded {} ({} bytes) to {}", key, written, path.display());
        Ok(written)
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "Bucket connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

async fn resolve_region(config: &StorageConfig) -> Region {
    RegionProviderChain::first_try(config.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(FALLBACK_REGION)
        .region()
        .await
        .unwrap_or_else(|| Region::new(FALLBACK_REGION))
}
