//! Process-local provider for tests and the in-memory backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::traits::storage::{ByteStream, StorageProvider};

/// Keeps blobs in a map keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    blobs: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStorageProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }

    async fn get(&self, path: &str) -> AppResult<Bytes> {
        self.blobs
            .read()
            .await
            .get(&key(path))
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("File not found: {path}")))
    }
}

fn key(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self.get(path).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.blobs.write().await.insert(key(path), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.blobs.write().await.remove(&key(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;
    use learnhub_core::error::ErrorKind;

    #[tokio::test]
    async fn test_keys_are_normalized() {
        let provider = MemoryStorageProvider::new();
        provider.write("/a/1.txt", Bytes::from("1")).await.unwrap();
        provider.write("ab/3.txt", Bytes::from("3")).await.unwrap();
        assert_eq!(provider.keys().await, vec!["a/1.txt".to_string(), "ab/3.txt".to_string()]);

        let chunk = provider.read("a/1.txt").await.unwrap().next().await.unwrap().unwrap();
        assert_eq!(chunk, Bytes::from("1"));

        provider.delete("a/1.txt").await.unwrap();
        let err = provider.read("a/1.txt").await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
