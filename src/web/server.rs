//! Web server for Depot.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::db::Database;
use crate::file::BlobStorage;
use crate::{DepotError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &ServerConfig,
        db: Arc<Database>,
        storage: Arc<BlobStorage>,
        max_upload_size: u64,
    ) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| DepotError::Config(format!("invalid server address: {e}")))?;

        let app_state = Arc::new(AppState::new(db, storage, max_upload_size));

        Ok(Self {
            addr,
            app_state,
            cors_origins: config.cors_origins.clone(),
        })
    }

    /// Run the server until it is shut down.
    pub async fn serve(self) -> Result<()> {
        let router = create_router(self.app_state, &self.cors_origins);

        let listener = TcpListener::bind(self.addr).await?;
        info!("Web API listening on {}", self.addr);

        axum::serve(listener, router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_with_valid_config() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(BlobStorage::new(temp_dir.path()).unwrap());

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        };

        let server = WebServer::new(&config, db, storage, 1024);
        assert!(server.is_ok());
    }

    #[tokio::test]
    async fn test_new_with_invalid_host() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(BlobStorage::new(temp_dir.path()).unwrap());

        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 0,
            cors_origins: vec![],
        };

        let result = WebServer::new(&config, db, storage, 1024);
        assert!(matches!(result, Err(DepotError::Config(_))));
    }
}
