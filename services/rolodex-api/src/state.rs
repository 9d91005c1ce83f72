//! Application state

use std::ops::Deref;
use std::sync::Arc;

use rolodex_auth_core::SessionManager;
use rolodex_db::{DbPool, SessionRepository, UserRepository};

use crate::config::Config;

/// Session manager over whichever repositories the binary was started with
pub type SessionManagerImpl = SessionManager<dyn UserRepository, dyn SessionRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle and request authentication
    pub auth: Arc<SessionManagerImpl>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(auth: SessionManagerImpl, pool: DbPool, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }

    /// Whether cookies must carry the `Secure` flag
    pub fn secure_cookies(&self) -> bool {
        self.config.is_production()
    }
}
