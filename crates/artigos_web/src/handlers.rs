use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use artigos_core::Artigo;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::payload::ArtigoForm;
use crate::AppState;

const NOT_FOUND: &str = "Article not found";

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Artigo>>, ApiError> {
    let artigos = state.storage.list_all().await?;
    Ok(Json(artigos))
}

pub async fn get_article_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artigo>, ApiError> {
    state
        .storage
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn get_article_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Artigo>, ApiError> {
    state
        .storage
        .find_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

#[derive(Debug, Deserialize)]
pub struct CheckSlugRequest {
    pub slug: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckSlugResponse {
    pub exists: bool,
}

/// Advisory check: does another article already use this slug?
pub async fn check_slug(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckSlugRequest>, JsonRejection>,
) -> Result<Json<CheckSlugResponse>, ApiError> {
    let Ok(Json(CheckSlugRequest { slug: Some(slug), id: Some(id) })) = payload else {
        return Err(ApiError::bad_request("Slug and ID are required"));
    };
    let exists = state.storage.slug_exists(&slug, &id).await?;
    debug!(slug = %slug, id = %id, exists, "Checked slug");
    Ok(Json(CheckSlugResponse { exists }))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    form: ArtigoForm,
) -> Result<impl IntoResponse, ApiError> {
    let artigo = state
        .storage
        .create(form.draft)
        .await
        .map_err(|e| ApiError::from_core(e, "Error creating article"))?;
    Ok((StatusCode::CREATED, Json(artigo)))
}

/// Full replacement: any field missing from the payload is reset to its
/// default. Only the cover image survives when no new one is uploaded.
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    form: ArtigoForm,
) -> Result<Json<Artigo>, ApiError> {
    let id = form
        .id
        .ok_or_else(|| ApiError::bad_request("Article ID is required"))?;
    let artigo = state
        .storage
        .update(&id, form.draft)
        .await
        .map_err(|e| ApiError::from_core(e, "Error updating article"))?;
    Ok(Json(artigo))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: Option<String>,
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Ok(Json(DeleteRequest { id: Some(id) })) = payload else {
        return Err(ApiError::bad_request("ID is required"));
    };
    state.storage.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
