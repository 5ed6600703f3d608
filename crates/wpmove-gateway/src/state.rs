use std::sync::Arc;

use wpmove_common::Result;
use wpmove_config::AppConfig;
use wpmove_db::{ExecutionMode, Migrator, SiteConnector};

use crate::render::PageRenderer;

/// Shared application state accessible from all request handlers.
pub struct AppState {
    pub migrator: Migrator,
    pub pages: PageRenderer,
}

impl AppState {
    pub fn new(config: &AppConfig, connector: Arc<dyn SiteConnector>) -> Result<Self> {
        let migrator = Migrator::new(connector, &config.database.host, config.database.port)
            .with_mode(ExecutionMode::from_flag(config.database.transactional));

        Ok(Self {
            migrator,
            pages: PageRenderer::new()?,
        })
    }
}

pub type SharedState = Arc<AppState>;
