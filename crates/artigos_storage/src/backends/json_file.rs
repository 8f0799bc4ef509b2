use artigos_core::{Artigo, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::PersistenceBackend;

/// Pretty-printed JSON array on disk, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("artigos.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<Artigo>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No article document yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let artigos: Vec<Artigo> = serde_json::from_slice(&bytes)?;
        info!(path = %self.path.display(), count = artigos.len(), "Loaded articles");
        Ok(artigos)
    }

    async fn persist(&self, artigos: &[Artigo]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(artigos)?;
        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).await?;
        file.write_all(&json).await?;
        // Contents must be on disk before the rename makes them visible.
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), count = artigos.len(), bytes = json.len(), "Persisted articles");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}
