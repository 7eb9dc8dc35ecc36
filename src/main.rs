use std::sync::Arc;

use tracing::{error, info};

use doorlist::{Config, Database, SqliteStore, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = doorlist::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        doorlist::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Doorlist stopped");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> doorlist::Result<()> {
    config.validate()?;
    info!("Doorlist - venue check-in service");

    let db = Database::open(&config.database.path, config.database.max_connections).await?;
    let store = Arc::new(SqliteStore::new(db));

    let server = WebServer::new(&config, store)?;
    info!("Server configured on {}", server.addr());
    server.run().await
}
