use std::path::PathBuf;
use std::sync::Arc;

use infodocs_export::cache::TemplateCache;
use infodocs_export::convert::Capabilities;
use infodocs_export::pipeline::Renderer;
use infodocs_storage::assets::{AssetStore, LocalAssetStore};

use crate::config::ServerConfig;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<Renderer>,
    /// Writes into the primary asset root.
    pub store: Arc<dyn AssetStore>,
    pub records_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &ServerConfig, capabilities: Capabilities) -> Self {
        let store: Arc<dyn AssetStore> = Arc::new(LocalAssetStore::new(
            config.render.asset_roots.primary.dir.clone(),
        ));
        let renderer = Renderer::new(
            config.render.clone(),
            capabilities,
            Arc::clone(&store),
            TemplateCache::new(config.records_dir.clone()),
        );
        Self {
            renderer: Arc::new(renderer),
            store,
            records_dir: config.records_dir.clone(),
        }
    }
}
