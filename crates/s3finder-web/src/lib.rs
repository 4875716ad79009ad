//! Axum web form for S3 file lookup.
//!
//! This crate provides:
//! - The search form (`GET /`) and lookup handler (`POST /`)
//! - Health and readiness probes
//! - Rate limiting, request IDs and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use views::Views;
