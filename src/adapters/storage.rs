use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::is_plain_file_name;
use std::path::{Path, PathBuf};

/// 上傳目錄；所有路徑都是目錄下的單一檔名
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if !is_plain_file_name(path) {
            return Err(EtlError::InvalidInputName {
                name: path.to_string(),
            });
        }
        Ok(Path::new(&self.base_path).join(path))
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let full_path = self.resolve(path)?;
        tokio::fs::remove_file(full_path).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = match self.resolve(path) {
            Ok(full_path) => full_path,
            Err(_) => return Ok(false),
        };
        Ok(tokio::fs::try_exists(full_path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> LocalStorage {
        LocalStorage::new(dir.path().to_str().unwrap().to_string())
    }

    #[test]
    fn test_read_then_delete() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("upload.csv"), b"email\na@x.com\n").unwrap();
        let storage = storage_in(&dir);

        tokio_test::block_on(async {
            assert!(storage.exists("upload.csv").await.unwrap());
            let data = storage.read_file("upload.csv").await.unwrap();
            assert_eq!(data, b"email\na@x.com\n");

            storage.delete_file("upload.csv").await.unwrap();
            assert!(!storage.exists("upload.csv").await.unwrap());
        });
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        assert!(!storage.exists("nope.csv").await.unwrap());
        assert!(matches!(
            storage.read_file("nope.csv").await,
            Err(EtlError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_names_outside_upload_dir() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        assert!(!storage.exists("../etc/passwd").await.unwrap());
        assert!(matches!(
            storage.read_file("../etc/passwd").await,
            Err(EtlError::InvalidInputName { .. })
        ));
    }
}
