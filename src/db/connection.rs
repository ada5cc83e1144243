use super::error::RepositoryError;
use super::{DbConnection, DbPool};
use anyhow::{Result, anyhow};
use diesel::SqliteConnection;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pragmas SQLite appliqués à chaque connexion sortie du pool:
/// les clés étrangères (et donc les ON DELETE CASCADE) sont désactivées par défaut.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Crée le pool et applique les migrations en attente
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| anyhow!("Failed to create database pool: {}", e))?;

    run_migrations(&pool)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .map_err(|e| anyhow!("Impossible de récupérer une connexion du pool: {}", e))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;

    for version in applied {
        tracing::info!(%version, "Applied migration");
    }
    Ok(())
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, RepositoryError> {
    pool.get().map_err(Into::into)
}

/// Pool sur une base SQLite jetable. Garder le `TempDir` en vie pendant le test.
#[cfg(test)]
pub fn test_pool() -> (DbPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.sqlite3");
    let pool = create_pool(db_path.to_str().expect("utf-8 temp path"), 4)
        .expect("Failed to create test pool");
    (pool, dir)
}
