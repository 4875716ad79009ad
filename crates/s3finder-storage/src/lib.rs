//! S3 storage facade for file lookup.
//!
//! This crate provides:
//! - Storage configuration resolved once from the environment
//! - Client authentication (static credentials or the default provider chain)
//! - Object existence probes
//! - Presigned download URL generation
//! - The composed lookup used by the web form

pub mod client;
pub mod config;
pub mod error;
pub mod finder;
pub mod key;

pub use client::{PresignedUrl, StorageClient};
pub use config::{StorageConfig, DEFAULT_BUCKET, DEFAULT_PRESIGN_EXPIRY_SECS};
pub use error::{StorageError, StorageResult};
pub use finder::{FileFinder, SearchOutcome};
pub use key::{ObjectKey, MAX_KEY_BYTES};
