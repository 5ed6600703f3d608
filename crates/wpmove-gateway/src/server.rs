use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use wpmove_common::{Error, Result};
use wpmove_config::AppConfig;
use wpmove_db::{MySqlConnector, SiteConnector};

use crate::router::build_router;
use crate::state::AppState;

/// The HTTP server that serves the migration form.
pub struct GatewayServer {
    config: AppConfig,
    connector: Arc<dyn SiteConnector>,
}

impl GatewayServer {
    /// Server that migrates MySQL databases.
    pub fn new(config: AppConfig) -> Self {
        Self::with_connector(config, Arc::new(MySqlConnector))
    }

    pub fn with_connector(config: AppConfig, connector: Arc<dyn SiteConnector>) -> Self {
        Self { config, connector }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);
        let database = format!(
            "{}:{}",
            self.config.database.host, self.config.database.port
        );

        let state = Arc::new(AppState::new(&self.config, self.connector)?);
        let app = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        info!("wpmove gateway listening on {addr}, migrating databases on {database}");

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Gateway(format!("server error: {e}")))?;

        Ok(())
    }
}
