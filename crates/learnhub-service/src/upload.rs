//! Files received from multipart requests.

use bytes::Bytes;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_storage::mime;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-side file name.
    pub file_name: String,
    /// Content type sent by the client.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Build a file from its parts.
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    /// Lowercased extension of the file name.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> i64 {
        self.data.len() as i64
    }

    /// Client content type unless generic, else a guess from the extension.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .or_else(|| mime::from_path(&self.file_name))
            .map(str::to_string)
    }
}

/// Upload size limits.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted file.
    pub max_file_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 20 * 1024 * 1024,
        }
    }
}

impl UploadLimits {
    /// Reject `file` when it exceeds the limit, reporting against `field`.
    pub fn check(&self, field: &str, file: &UploadedFile) -> AppResult<()> {
        if file.data.len() as u64 > self.max_file_bytes {
            return Err(AppError::field(
                field,
                "max",
                format!(
                    "The file {} may not be greater than {} kilobytes",
                    file.file_name,
                    self.max_file_bytes / 1024
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata() {
        let file = UploadedFile::new("Convocation.PDF", None, Bytes::from_static(b"%PDF"));
        assert_eq!(file.extension().as_deref(), Some("pdf"));
        assert_eq!(file.mime_type().as_deref(), Some("application/pdf"));
        assert_eq!(file.size_bytes(), 4);

        let typed = UploadedFile::new("notes", Some("text/plain".into()), Bytes::new());
        assert_eq!(typed.extension(), None);
        assert_eq!(typed.mime_type().as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_limit() {
        let limits = UploadLimits { max_file_bytes: 2 };
        let file = UploadedFile::new("a.txt", None, Bytes::from_static(b"abc"));
        let err = limits.check("files", &file).unwrap_err();
        assert!(err.fields.unwrap().contains("files"));
    }
}
