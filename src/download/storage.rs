//! Storage sink for persisted downloads.

use std::path::Path;

use async_trait::async_trait;

/// Accepts `(path, bytes)` for downloads that are saved rather than kept
/// in memory.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `bytes` to `path`, replacing any existing file.
    async fn save(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes to the local filesystem, creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

#[async_trait]
impl Storage for FileStorage {
    async fn save(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("images").join("a.png");
        FileStorage.save(&path, b"png").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png");
    }
}
