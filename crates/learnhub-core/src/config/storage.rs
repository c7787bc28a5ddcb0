//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration for uploaded documents and rule attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root path for local file storage.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_root() -> String {
    "./data/storage".to_string()
}

fn default_max_upload() -> u64 {
    20 * 1024 * 1024
}
