use std::sync::Arc;

use starter_core::{AppConfig, Auth, Database};

/// Shared state handed to every handler.
///
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<Auth>,
    pub db: Arc<dyn Database>,
}

impl AppState {
    pub fn new(config: AppConfig, auth: Auth, db: Arc<dyn Database>) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            db,
        }
    }
}
