use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::adapters::users_memory::InMemoryUserStore;
use crate::auth::password::PasswordHasher;
use crate::repos::users::UserStore;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Credential store every handler goes through
    pub store: Arc<dyn UserStore>,
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    /// Hasher configured with `security.bcrypt_cost`
    pub hasher: PasswordHasher,
    /// Database connection behind `store`, when there is one (health checks)
    pub db: Option<DatabaseConnection>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UserStore>,
        security: SecurityConfig,
        db: Option<DatabaseConnection>,
    ) -> Self {
        let hasher = PasswordHasher::new(security.bcrypt_cost);
        Self {
            store,
            security,
            hasher,
            db,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    /// In-memory store and the test security config.
    pub fn for_tests() -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            SecurityConfig::for_tests(),
            None,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("algorithm", &self.security.algorithm)
            .field("bcrypt_cost", &self.hasher.cost())
            .field("has_db", &self.db.is_some())
            .finish()
    }
}
