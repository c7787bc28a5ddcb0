//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use learnhub_auth::JwtDecoder;
use learnhub_core::config::AppConfig;
use learnhub_core::traits::{Clock, StorageProvider};
use learnhub_database::Stores;
use learnhub_service::{Services, UploadLimits};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Store bundle, kept for health checks
    pub stores: Stores,
    /// Blob storage, kept for health checks
    pub storage: Arc<dyn StorageProvider>,
    /// Bearer token verifier
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Business services
    pub services: Arc<Services>,
}

impl AppState {
    /// Wire the services over `stores` and `storage`.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let limits = UploadLimits {
            max_file_bytes: config.storage.max_upload_size_bytes,
        };
        let services = Services::new(&stores, storage.clone(), clock, limits);
        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            stores,
            storage,
            services: Arc::new(services),
        }
    }
}
