use std::net::SocketAddr;

use anyhow::Context;
use chrono::Utc;
use crud_lab::app::build_router;
use crud_lab::config::Config;
use crud_lab::db::connection::{create_pool, get_connection};
use crud_lab::db::repositories::session_repository::SessionRepository;
use crud_lab::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new("info,crud_lab=debug,hyper_util=warn,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let config = Config::from_env()?;
    tracing::info!(environment = config.environment.as_str(), "Starting crud-lab...");

    let pool = create_pool(&config.database_url, config.database_pool_size)?;
    {
        let mut conn = get_connection(&pool)?;
        let expired = SessionRepository::delete_expired(&mut conn, Utc::now().naive_utc())?;
        if expired > 0 {
            tracing::info!(expired, "Removed expired sessions");
        }
    }

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Cannot create media root {}", config.media_root.display()))?;

    let addr = config.bind_address();
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server running at http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
