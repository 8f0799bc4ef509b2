use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod payload;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{serve, shutdown_signal};
pub use state::AppState;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Served under `/images`
    pub upload_dir: PathBuf,
    /// Request body limit, uploads included
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            upload_dir: PathBuf::from(artigos_storage::DEFAULT_UPLOAD_DIR),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(
            "/api/artigos",
            get(handlers::list_articles)
                .post(handlers::create_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route("/api/artigos/id/:id", get(handlers::get_article_by_id))
        .route("/api/artigos/slug/:slug", get(handlers::get_article_by_slug))
        .route("/api/artigos/check-slug", post(handlers::check_slug))
        .route("/api/artigos/check_slug", post(handlers::check_slug))
        .nest_service("/images", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use artigos_core::{Artigo, Error, Result};
    pub use crate::{create_app, AppState, ServerConfig};
}
