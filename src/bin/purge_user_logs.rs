//! Supprime les entrées du journal plus vieilles que `LOG_RETENTION_DAYS`,
//! ainsi que les sessions expirées.

use anyhow::Context;
use chrono::Utc;
use crud_lab::config::Config;
use crud_lab::db::connection::{create_pool, get_connection};
use crud_lab::db::repositories::session_repository::SessionRepository;
use crud_lab::services::audit::AuditService;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = create_pool(&config.database_url, 1)?;

    let removed = AuditService::new(pool.clone())
        .purge(config.log_retention_days)
        .context("Failed to purge user logs")?;

    let mut conn = get_connection(&pool)?;
    let expired = SessionRepository::delete_expired(&mut conn, Utc::now().naive_utc())
        .context("Failed to delete expired sessions")?;

    tracing::info!(removed, expired, "Purge complete");
    Ok(())
}
