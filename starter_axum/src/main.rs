use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starter_axum::{AppState, Server, app_router};
use starter_core::{AppConfig, Auth, Database, StubDatabase, load_env};

const DEFAULT_LOG_FILTER: &str =
    "starter=debug,starter_axum=debug,starter_core=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_file = load_env();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match env_file {
        Some(path) => tracing::debug!("Loaded environment from {}", path.display()),
        None => tracing::warn!("Warning: .env not loaded, using process environment"),
    }

    let config = AppConfig::from_env();
    let auth = Auth::new(&config.auth)?;
    let db: Arc<dyn Database> = Arc::new(StubDatabase);

    let state = AppState::new(config.clone(), auth, db.clone());
    Server::from_config(&config, app_router(state)).serve().await?;

    db.close().await?;
    Ok(())
}
