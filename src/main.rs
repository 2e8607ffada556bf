use std::sync::Arc;

use tracing::{error, info};

use depot::{BlobStorage, Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config_path = std::env::var("DEPOT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = depot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        depot::logging::init_console_only(&config.logging.level);
    }

    info!("Depot file service");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let storage = match BlobStorage::new(&config.storage.path) {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to initialize upload storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Upload storage at {}", config.storage.path);

    let server = match WebServer::new(
        &config.server,
        Arc::new(db),
        Arc::new(storage),
        config.storage.max_upload_size_bytes,
    ) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to configure server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve().await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
