use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::services::AuthService;
use crate::config::Config;
use crate::db::DbPool;
use crate::services::audit::AuditService;
use crate::services::dashboard::DashboardService;
use crate::services::table1::Table1Service;
use crate::services::table2::Table2Service;
use crate::services::table3::Table3Service;
use crate::storage::MediaStorage;

/// État partagé par tous les handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub storage: MediaStorage,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let storage = MediaStorage::new(config.media_root.clone(), config.media_url.clone());
        Self {
            pool,
            storage,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Table1Service {
    fn from_ref(state: &AppState) -> Self {
        Table1Service::new(state.pool.clone(), state.storage.clone())
    }
}

impl FromRef<AppState> for Table2Service {
    fn from_ref(state: &AppState) -> Self {
        Table2Service::new(state.pool.clone(), state.storage.clone())
    }
}

impl FromRef<AppState> for Table3Service {
    fn from_ref(state: &AppState) -> Self {
        Table3Service::new(state.pool.clone())
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        AuthService::new(state.pool.clone(), state.config.clone())
    }
}

impl FromRef<AppState> for AuditService {
    fn from_ref(state: &AppState) -> Self {
        AuditService::new(state.pool.clone())
    }
}

impl FromRef<AppState> for DashboardService {
    fn from_ref(state: &AppState) -> Self {
        DashboardService::new(state.pool.clone())
    }
}

/// État de test: base SQLite et `MEDIA_ROOT` jetables
#[cfg(test)]
pub fn test_state() -> (AppState, tempfile::TempDir, tempfile::TempDir) {
    let (pool, db_dir) = crate::db::connection::test_pool();
    let media_dir = tempfile::tempdir().expect("Failed to create media dir");
    let config = Config {
        media_root: media_dir.path().to_path_buf(),
        ..Config::default()
    };
    (AppState::new(pool, config), db_dir, media_dir)
}
