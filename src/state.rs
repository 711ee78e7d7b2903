use std::sync::Arc;

use crate::auth::{AuthResolver, TokenIssuer};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Shared by every handler. Built once at startup from an explicit config.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseManager,
    pub resolver: Arc<AuthResolver>,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseManager) -> Self {
        let resolver = AuthResolver::new(&config.security);
        let issuer = TokenIssuer::new(&config.security);

        Self {
            config: Arc::new(config),
            db,
            resolver: Arc::new(resolver),
            issuer: Arc::new(issuer),
        }
    }
}
