use std::sync::Arc;
use tracing::info;

use factory_health::config::Config;
use factory_health::health::engine::HealthEngine;
use factory_health::web::server::WebServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "factory-health.toml".to_string());

    let config = Config::load(&config_path)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "factory_health=info,tower_http=info".into());
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("factory-health v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Config loaded from {}", config_path);
    info!("Unknown machine policy: {:?}", config.scoring.unknown_machine);

    let engine = Arc::new(HealthEngine::new(config)?);
    let config = engine.config.clone();

    let web = WebServer::new(engine, config);
    web.run().await
}
