use artigos_core::{Artigo, ArtigoDraft, ArtigoStorage, Error, Result, TextoItem};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backends::PersistenceBackend;
use crate::images::ImageStore;

/// The article collection, kept in memory and mirrored to a backend.
///
/// Mutations hold the write lock for their whole read-modify-write cycle,
/// file I/O included, so concurrent requests cannot lose each other's
/// changes. If persisting fails the in-memory change is rolled back; files
/// already written for the request are left in place.
pub struct ArtigoRepository {
    artigos: RwLock<Vec<Artigo>>,
    backend: Box<dyn PersistenceBackend>,
    images: ImageStore,
    enforce_unique_slugs: bool,
}

impl ArtigoRepository {
    pub async fn open(
        backend: Box<dyn PersistenceBackend>,
        images: ImageStore,
        enforce_unique_slugs: bool,
    ) -> Result<Self> {
        let artigos = backend.load().await?;
        info!(
            backend = %backend.describe(),
            uploads = %images.dir().display(),
            count = artigos.len(),
            "Article repository ready"
        );
        Ok(Self {
            artigos: RwLock::new(artigos),
            backend,
            images,
            enforce_unique_slugs,
        })
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    fn ensure_slug_available(&self, artigos: &[Artigo], slug: &str, id: &str) -> Result<()> {
        if !self.enforce_unique_slugs || slug.is_empty() {
            return Ok(());
        }
        if artigos.iter().any(|a| a.slug == slug && a.id != id) {
            return Err(Error::Conflict(format!("Slug '{}' is already in use", slug)));
        }
        Ok(())
    }

    async fn store_texto(&self, items: Vec<TextoItem>) -> Result<Vec<String>> {
        let mut texto = Vec::with_capacity(items.len());
        for item in items {
            match item {
                TextoItem::Text(text) => texto.push(text),
                TextoItem::Upload(upload) => texto.push(self.images.save(&upload).await?),
            }
        }
        Ok(texto)
    }

    /// Remove every managed image of `previous` that `current` no longer references.
    async fn remove_images(&self, previous: &Artigo, current: Option<&Artigo>) {
        let keep: HashSet<&str> = current
            .map(|a| a.image_references().collect())
            .unwrap_or_default();
        let mut seen = HashSet::new();

        for reference in previous.image_references() {
            if keep.contains(reference) || !seen.insert(reference) {
                continue;
            }
            if let Err(e) = self.images.remove(reference).await {
                warn!(image = %reference, error = %e, "Failed to remove image");
            }
        }
    }
}

#[async_trait]
impl ArtigoStorage for ArtigoRepository {
    async fn list_all(&self) -> Result<Vec<Artigo>> {
        Ok(self.artigos.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Artigo>> {
        let artigos = self.artigos.read().await;
        Ok(artigos.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Artigo>> {
        let artigos = self.artigos.read().await;
        Ok(artigos.iter().find(|a| a.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str, id: &str) -> Result<bool> {
        let artigos = self.artigos.read().await;
        Ok(artigos.iter().any(|a| a.slug == slug && a.id != id))
    }

    async fn create(&self, draft: ArtigoDraft) -> Result<Artigo> {
        let mut artigos = self.artigos.write().await;
        self.ensure_slug_available(&artigos, &draft.slug, "")?;

        let imagem = match &draft.imagem {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };
        let texto = self.store_texto(draft.texto).await?;

        let artigo = Artigo {
            id: Uuid::new_v4().to_string(),
            index: artigos.len() as i64 + 1,
            titulo: draft.titulo,
            sumario: draft.sumario,
            assunto: draft.assunto,
            slug: draft.slug,
            data: draft.data,
            autor: draft.autor,
            texto,
            imagem,
        };

        artigos.push(artigo.clone());
        if let Err(e) = self.backend.persist(&artigos).await {
            artigos.pop();
            return Err(e);
        }

        info!(id = %artigo.id, slug = %artigo.slug, index = artigo.index, "Created article");
        Ok(artigo)
    }

    async fn update(&self, id: &str, draft: ArtigoDraft) -> Result<Artigo> {
        let mut artigos = self.artigos.write().await;
        let position = artigos
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::not_found("Article not found"))?;
        self.ensure_slug_available(&artigos, &draft.slug, id)?;

        let previous = artigos[position].clone();
        let imagem = match &draft.imagem {
            Some(upload) => Some(self.images.save(upload).await?),
            None => previous.imagem.clone(),
        };
        let texto = self.store_texto(draft.texto).await?;

        let updated = Artigo {
            id: previous.id.clone(),
            index: draft.index,
            titulo: draft.titulo,
            sumario: draft.sumario,
            assunto: draft.assunto,
            slug: draft.slug,
            data: draft.data,
            autor: draft.autor,
            texto,
            imagem,
        };

        artigos[position] = updated.clone();
        if let Err(e) = self.backend.persist(&artigos).await {
            artigos[position] = previous;
            return Err(e);
        }

        self.remove_images(&previous, Some(&updated)).await;
        info!(id = %updated.id, slug = %updated.slug, "Updated article");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut artigos = self.artigos.write().await;
        let position = artigos
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::not_found("Article not found"))?;

        let removed = artigos.remove(position);
        if let Err(e) = self.backend.persist(&artigos).await {
            artigos.insert(position, removed);
            return Err(e);
        }

        self.remove_images(&removed, None).await;
        info!(id = %removed.id, slug = %removed.slug, "Deleted article");
        Ok(())
    }
}
