//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use learnhub_core::error::{AppError, ErrorKind};
use learnhub_core::result::AppResult;
use learnhub_core::traits::storage::{ByteStream, StorageProvider};

/// Stores every object as a file below one root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

fn storage_error(action: &str, path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("File not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

impl LocalStorageProvider {
    /// Create the provider, creating `root_path` when missing.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a key onto a path below the root. Keys climbing out of the root
    /// are rejected.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root).await.is_ok_and(|m| m.is_dir()))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let file = fs::File::open(self.resolve(path)?)
            .await
            .map_err(|e| storage_error("open file", path, e))?;
        Ok(Box::pin(ReaderStream::new(file).map(|chunk| chunk.map(Bytes::from))))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;
        fs::write(&full_path, &data)
            .await
            .map_err(|e| storage_error("write file", path, e))?;
        debug!(path, bytes = data.len(), "Stored blob");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        match fs::remove_file(self.resolve(path)?).await {
            Ok(()) => {
                debug!(path, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete file", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(provider: &LocalStorageProvider, path: &str) -> AppResult<Vec<u8>> {
        let mut stream = provider.read(path).await?;
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        Ok(collected)
    }

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap()).await.unwrap();
        (dir, provider)
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let (dir, provider) = provider().await;

        provider.write("documents/org/a.pdf", Bytes::from("hello world")).await.unwrap();
        assert!(dir.path().join("documents/org/a.pdf").is_file());
        assert_eq!(read_all(&provider, "documents/org/a.pdf").await.unwrap(), b"hello world");

        provider.delete("documents/org/a.pdf").await.unwrap();
        assert!(!dir.path().join("documents/org/a.pdf").exists());
        // Second delete is a no-op.
        provider.delete("documents/org/a.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, provider) = provider().await;
        let err = read_all(&provider, "nope.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_parent_components() {
        let (_dir, provider) = provider().await;
        let err = provider.write("../escape.txt", Bytes::from("x")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_health_check_needs_the_root() {
        let (dir, provider) = provider().await;
        assert!(provider.health_check().await.unwrap());
        drop(dir);
        assert!(!provider.health_check().await.unwrap());
    }
}
