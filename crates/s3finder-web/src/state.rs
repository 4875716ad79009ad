//! Application state.

use std::sync::Arc;

use s3finder_storage::{FileFinder, StorageConfig};

use crate::config::ApiConfig;
use crate::views::Views;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub finder: Arc<FileFinder>,
    pub views: Arc<Views>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: ApiConfig,
        storage: StorageConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let views = Views::new(config.is_production())?;

        Ok(Self {
            config,
            finder: Arc::new(FileFinder::new(storage)),
            views: Arc::new(views),
        })
    }
}
