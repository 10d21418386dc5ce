// Application state module
// Shared by every connection of the process

use std::sync::Arc;

use super::types::Config;
use crate::assets::AssetFetcher;
use crate::handler::Dispatcher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: &Config, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            dispatcher: Dispatcher::from_config(fetcher, &config.spa),
            config: config.clone(),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
