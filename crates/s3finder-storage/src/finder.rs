//! Composed lookup: authenticate, probe, sign.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::client::{PresignedUrl, StorageClient};
use crate::config::StorageConfig;
use crate::key::ObjectKey;

/// Result of a file search.
///
/// Callers that only care whether a link was produced use
/// [`SearchOutcome::into_url`]; the other variants exist for logging and
/// metrics.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(PresignedUrl),
    NotFound,
    InvalidKey(String),
    AuthFailure(String),
    BackendError(String),
    SigningFailure(String),
}

impl SearchOutcome {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SearchOutcome::Found(_) => "found",
            SearchOutcome::NotFound => "not_found",
            SearchOutcome::InvalidKey(_) => "invalid_key",
            SearchOutcome::AuthFailure(_) => "auth_failure",
            SearchOutcome::BackendError(_) => "backend_error",
            SearchOutcome::SigningFailure(_) => "signing_failure",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn into_url(self) -> Option<PresignedUrl> {
        match self {
            SearchOutcome::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Looks up files in the configured bucket and signs download links.
///
/// A fresh [`StorageClient`] is authenticated for every search.
#[derive(Debug, Clone)]
pub struct FileFinder {
    config: Arc<StorageConfig>,
}

impl FileFinder {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Search for `file_name` and sign a download URL when it exists.
    ///
    /// Never fails: every error is logged and reported as an outcome.
    pub async fn search(&self, file_name: &str) -> SearchOutcome {
        let bucket = self.config.bucket.as_str();

        let key = match ObjectKey::parse(file_name) {
            Ok(key) => key,
            Err(e) => {
                warn!(bucket, error = %e, "Rejected file name");
                return SearchOutcome::InvalidKey(e.to_string());
            }
        };

        let client = match StorageClient::authenticate(&self.config).await {
            Ok(client) => client,
            Err(e) => {
                error!(bucket, error = %e, "Failed to authenticate to storage");
                return SearchOutcome::AuthFailure(e.to_string());
            }
        };

        match client.exists(&key).await {
            Ok(true) => {
                info!(bucket, key = %key, "File exists");
            }
            Ok(false) => {
                info!(bucket, key = %key, "File does not exist");
                return SearchOutcome::NotFound;
            }
            Err(e) => {
                error!(bucket, key = %key, error = %e, "Existence check failed");
                return SearchOutcome::BackendError(e.to_string());
            }
        }

        match client.presign_download(&key, self.config.presign_expiry).await {
            Ok(url) => SearchOutcome::Found(url),
            Err(e) => {
                error!(bucket, key = %key, error = %e, "Failed to sign download URL");
                SearchOutcome::SigningFailure(e.to_string())
            }
        }
    }

    /// Collapsed form of [`FileFinder::search`]: the URL, or nothing.
    pub async fn search_and_download_file(&self, file_name: &str) -> Option<PresignedUrl> {
        self.search(file_name).await.into_url()
    }
}
