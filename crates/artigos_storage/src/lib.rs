use artigos_core::{ArtigoStorage, Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub mod backends;
pub mod images;
pub mod repository;

pub use backends::*;
pub use images::ImageStore;
pub use repository::ArtigoRepository;

pub const DEFAULT_DATA_FILE: &str = "artigos.json";
pub const DEFAULT_UPLOAD_DIR: &str = "static/images";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON document holding the collection
    pub data_file: PathBuf,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Reject writes whose slug is already used by another article
    pub enforce_unique_slugs: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            enforce_unique_slugs: false,
        }
    }
}

impl StorageConfig {
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    pub fn with_upload_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload_dir = path.into();
        self
    }

    pub fn with_unique_slugs(mut self, enforce: bool) -> Self {
        self.enforce_unique_slugs = enforce;
        self
    }
}

/// Pick the persistence backend for `kind` (`json` or `memory`).
///
/// Touches nothing on disk; read-only callers can `load` from it directly.
pub fn open_backend(kind: &str, config: &StorageConfig) -> Result<Box<dyn PersistenceBackend>> {
    match kind {
        "json" => Ok(Box::new(JsonFileBackend::new(&config.data_file))),
        "memory" => Ok(Box::new(MemoryBackend::new())),
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {} (expected json or memory)",
            other
        ))),
    }
}

/// Open a repository on the named backend (`json` or `memory`).
pub async fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn ArtigoStorage>> {
    let backend = open_backend(kind, config)?;
    let images = ImageStore::open(&config.upload_dir).await?;
    let repository = ArtigoRepository::open(backend, images, config.enforce_unique_slugs).await?;
    Ok(Arc::new(repository))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, open_backend, ArtigoRepository, ImageStore, StorageConfig};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_storage_rejects_unknown_backend() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig::default().with_upload_dir(dir.path().join("images"));
        let result = create_storage("qdrant", &config).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!dir.path().join("images").exists());
    }

    #[tokio::test]
    async fn test_open_backend_reads_without_creating_upload_dir() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("artigos.json");
        std::fs::write(&data_file, r#"[{"id":"a1","index":1,"titulo":"Um"}]"#).unwrap();
        let config = StorageConfig::default()
            .with_data_file(&data_file)
            .with_upload_dir(dir.path().join("static").join("images"));

        let artigos = open_backend("json", &config).unwrap().load().await.unwrap();
        assert_eq!(artigos.len(), 1);
        assert_eq!(artigos[0].titulo, "Um");
        assert!(!dir.path().join("static").exists());
        assert!(open_backend("sqlite", &config).is_err());
    }

    #[tokio::test]
    async fn test_create_storage_json_starts_empty() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig::default()
            .with_data_file(dir.path().join("artigos.json"))
            .with_upload_dir(dir.path().join("static").join("images"));
        let storage = create_storage("json", &config).await.unwrap();
        assert!(storage.list_all().await.unwrap().is_empty());
        assert!(dir.path().join("static").join("images").is_dir());
    }
}
