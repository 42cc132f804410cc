use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::adapters::users_memory::InMemoryUserStore;
use crate::adapters::users_sea::SeaUserStore;
use crate::config::db::DbKind;
use crate::config::settings::DEFAULT_STORE_TIMEOUT_MS;
use crate::error::AppError;
use crate::infra::db::{bootstrap_db, migrate_up};
use crate::repos::users::{TimeoutStore, UserStore};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

enum StoreChoice {
    Memory,
    Kind(DbKind),
    Connection(DatabaseConnection),
    Custom(Arc<dyn UserStore>),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    store: StoreChoice,
    store_timeout: Duration,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::for_tests(),
            store: StoreChoice::Memory,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }

    /// Connect (and migrate) the database named by `kind`.
    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.store = if kind.is_sql() {
            StoreChoice::Kind(kind)
        } else {
            StoreChoice::Memory
        };
        self
    }

    /// Use an already-open connection; migrations still run.
    pub fn with_connection(mut self, conn: DatabaseConnection) -> Self {
        self.store = StoreChoice::Connection(conn);
        self
    }

    /// Use a caller-supplied store, e.g. a deliberately slow one.
    pub fn with_store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = StoreChoice::Custom(store);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let (inner, db): (Arc<dyn UserStore>, Option<DatabaseConnection>) = match self.store {
            StoreChoice::Memory => {
                info!("using in-memory credential store");
                (Arc::new(InMemoryUserStore::new()), None)
            }
            StoreChoice::Kind(kind) => {
                // single entrypoint: build + migrate
                let conn = bootstrap_db(kind).await?;
                (Arc::new(SeaUserStore::new(conn.clone())), Some(conn))
            }
            StoreChoice::Connection(conn) => {
                migrate_up(&conn).await?;
                (Arc::new(SeaUserStore::new(conn.clone())), Some(conn))
            }
            StoreChoice::Custom(store) => (store, None),
        };

        let store = Arc::new(TimeoutStore::new(inner, self.store_timeout));
        Ok(AppState::new(store, self.security_config, db))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
