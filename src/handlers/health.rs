use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::db::DbPool;
use crate::db::connection::get_connection;

/// GET /health
/// 200 si une connexion au pool est disponible, 503 sinon
pub async fn health(State(pool): State<DbPool>) -> (StatusCode, Json<Value>) {
    match get_connection(&pool) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "database": "ok"})),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "degraded", "database": "unavailable"})),
            )
        }
    }
}
