use std::sync::Arc;

use quoterack_core::CatalogRepository;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
}
