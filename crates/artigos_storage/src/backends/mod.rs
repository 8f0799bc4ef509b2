use artigos_core::{Artigo, Result};
use async_trait::async_trait;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// Where the repository mirrors its collection after every mutation.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Read the stored collection. A store that does not exist yet is empty.
    async fn load(&self) -> Result<Vec<Artigo>>;

    /// Replace the stored collection with `artigos`.
    async fn persist(&self, artigos: &[Artigo]) -> Result<()>;

    fn describe(&self) -> String;
}
