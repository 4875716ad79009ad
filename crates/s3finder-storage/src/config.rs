//! Storage configuration.

use std::time::Duration;

/// Bucket searched by the finder. Not configurable.
pub const DEFAULT_BUCKET: &str = "images_buket";

/// Default lifetime of presigned download URLs (1 hour).
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Longest lifetime SigV4 allows for a presigned URL (7 days).
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 604_800;

/// Region used when neither the config nor the default chain yields one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Storage configuration, resolved once at startup.
#[derive(Clone)]
pub struct StorageConfig {
    /// Access key ID (optional; falls back to the default provider chain)
    pub access_key_id: Option<String>,
    /// Secret access key (optional; falls back to the default provider chain)
    pub secret_access_key: Option<String>,
    /// Region (optional; falls back to the default region chain)
    pub region: Option<String>,
    /// Endpoint override for S3-compatible backends
    pub endpoint_url: Option<String>,
    /// Use path-style addressing
    pub force_path_style: bool,
    /// Bucket name
    pub bucket: String,
    /// Presigned URL lifetime
    pub presign_expiry: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            bucket: DEFAULT_BUCKET.to_string(),
            presign_expiry: Duration::from_secs(DEFAULT_PRESIGN_EXPIRY_SECS),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .field("bucket", &self.bucket)
            .field("presign_expiry", &self.presign_expiry)
            .finish()
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint_url = var("S3_ENDPOINT_URL");
        let force_path_style = var("S3_FORCE_PATH_STYLE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(endpoint_url.is_some());

        let expiry_secs = var("PRESIGN_EXPIRY_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PRESIGN_EXPIRY_SECS)
            .clamp(1, MAX_PRESIGN_EXPIRY_SECS);

        Self {
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_KEY").or_else(|| var("AWS_SECRET_ACCESS_KEY")),
            region: var("AWS_REGION"),
            endpoint_url,
            force_path_style,
            bucket: DEFAULT_BUCKET.to_string(),
            presign_expiry: Duration::from_secs(expiry_secs),
        }
    }

    /// Whether both halves of a static key pair are configured.
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Whether exactly one half of a static key pair is configured.
    pub fn has_partial_credentials(&self) -> bool {
        self.access_key_id.is_some() != self.secret_access_key.is_some()
    }
}
