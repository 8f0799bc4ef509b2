use artigos_core::{Artigo, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::PersistenceBackend;

/// Keeps the last persisted snapshot in memory. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    snapshot: Arc<RwLock<Vec<Artigo>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Artigo> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<Artigo>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn persist(&self, artigos: &[Artigo]) -> Result<()> {
        *self.snapshot.write().await = artigos.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert!(backend.load().await.unwrap().is_empty());

        let artigo = Artigo {
            id: "abc".to_string(),
            index: 1,
            titulo: "Test Article".to_string(),
            ..Default::default()
        };
        backend.persist(&[artigo.clone()]).await.unwrap();

        let clone = backend.clone();
        assert_eq!(clone.snapshot().await, vec![artigo]);
    }
}
