//! # learnhub-storage
//!
//! Blob storage for course documents and automation rule attachments.
//! Services only see `Arc<dyn StorageProvider>`; this crate supplies the
//! local filesystem provider used in production and an in-memory provider
//! used by tests.

pub mod keys;
pub mod mime;
pub mod providers;

use std::sync::Arc;

use learnhub_core::config::StorageConfig;
use learnhub_core::result::AppResult;
use learnhub_core::traits::StorageProvider;

pub use providers::{LocalStorageProvider, MemoryStorageProvider};

/// Build the provider described by `config`.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider = LocalStorageProvider::new(&config.root_path).await?;
    tracing::info!(root = %config.root_path, "Local storage provider ready");
    Ok(Arc::new(provider))
}
