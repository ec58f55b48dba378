use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
};

/// Everything a request needs, built once at start-up and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        Self {
            pool,
            orm,
            config: Arc::new(config),
        }
    }

    /// Closes both connection handles. Called once the server has drained.
    pub async fn shutdown(self) {
        self.pool.close().await;
        if let Err(err) = self.orm.close().await {
            tracing::warn!(error = %err, "failed to close orm connection");
        }
    }
}
