use async_trait::async_trait;
use crate::types::{Artigo, ArtigoDraft};
use crate::Result;

#[async_trait]
pub trait ArtigoStorage: Send + Sync {
    /// Every article, in insertion order
    async fn list_all(&self) -> Result<Vec<Artigo>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Artigo>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Artigo>>;

    /// Whether an article other than `id` already uses `slug`
    async fn slug_exists(&self, slug: &str, id: &str) -> Result<bool>;

    /// Store a new article built from `draft` and persist the collection
    async fn create(&self, draft: ArtigoDraft) -> Result<Artigo>;

    /// Replace every field of article `id` except the id itself.
    ///
    /// Returns [`crate::Error::NotFound`] without touching anything when the
    /// id is unknown.
    async fn update(&self, id: &str, draft: ArtigoDraft) -> Result<Artigo>;

    /// Remove article `id` together with the image files it references
    async fn delete(&self, id: &str) -> Result<()>;
}
