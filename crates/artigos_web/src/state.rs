use artigos_core::ArtigoStorage;
use std::sync::Arc;

pub struct AppState {
    pub storage: Arc<dyn ArtigoStorage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArtigoStorage>) -> Self {
        Self { storage }
    }
}
