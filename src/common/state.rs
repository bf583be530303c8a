use std::sync::Arc;

use crate::config::Config;
use crate::envdata::EnvDataClient;
use crate::services::cache::{build_catalog_cache, CatalogCache};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<EnvDataClient>,
    pub catalog_cache: CatalogCache,
}

impl AppState {
    pub fn new(config: Config, client: EnvDataClient) -> Self {
        let catalog_cache = build_catalog_cache(config.catalog_cache_ttl());

        Self {
            config: Arc::new(config),
            client: Arc::new(client),
            catalog_cache,
        }
    }

    /// State with a client built from `config`.
    pub fn from_config(config: Config) -> Self {
        let client = EnvDataClient::new(&config);
        Self::new(config, client)
    }
}
