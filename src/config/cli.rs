use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Saves reports and exports under a base directory. Absolute paths given to
/// `read_file` are read as-is, so ledgers can live anywhere.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage
            .write_file("nested/Reconciliation_Report_2024-05-01.xlsx", b"PK")
            .await
            .unwrap();

        let data = storage
            .read_file("nested/Reconciliation_Report_2024-05-01.xlsx")
            .await
            .unwrap();
        assert_eq!(data, b"PK".to_vec());
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_base() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = temp_dir.path().join("eth.xlsx");
        std::fs::write(&ledger, b"ledger").unwrap();

        let storage = LocalStorage::new("./does-not-matter".to_string());
        let data = storage.read_file(ledger.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"ledger".to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let err = storage.read_file("absent.xlsx").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::ReconError::IoError(_)));
    }
}
