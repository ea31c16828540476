use sqlx::PgPool;

use crate::config::Config;

/// Request-scoped application context, passed explicitly through axum
/// state instead of living in a module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: Config,
}

impl AppState {
    pub fn new(db: PgPool, env: Config) -> Self {
        Self { db, env }
    }
}
