// src/error.rs

use crud_lab_api::ErrorResponse;
use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::password::PasswordError;
use crate::db::error::RepositoryError;
use crate::storage::StorageError;

/// Message générique renvoyé pour tout échec de login
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Erreurs Repository ===
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    DatabaseError(String),

    // === Erreurs d'Authentification ===
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),

    // === Erreurs de Hashing ===
    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    // === Erreurs de Validation ===
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    InvalidInput(String),

    // === Erreurs de routage ===
    #[error("Method not allowed")]
    MethodNotAllowed,

    // === Erreurs internes ===
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(%status, error = %self, "Request failed");
        } else {
            tracing::debug!(%status, error = %self, "Request rejected");
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl AppError {
    /// Code HTTP associé à l'erreur
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 404 Not Found
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 400 Bad Request
            AppError::Duplicate(_) | AppError::ValidationError(_) | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 / 403
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,

            // 405
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // 500: le texte de l'erreur est renvoyé tel quel
            AppError::PasswordHashingFailed(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // === Constructeurs helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Duplicate(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }
}

// === Conversions automatiques depuis d'autres types d'erreurs ===

// Depuis RepositoryError
impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => AppError::not_found("Object not found"),
            RepositoryError::UniqueViolation(msg) => AppError::duplicate(msg),
            RepositoryError::ForeignKeyViolation(_) => {
                AppError::invalid_input("Related object not found")
            }
            RepositoryError::CheckViolation(msg) => AppError::validation(msg),
            RepositoryError::PoolError(msg) | RepositoryError::DatabaseError(msg) => {
                AppError::database(msg)
            }
        }
    }
}

// Depuis diesel directement (closures de transaction)
impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::PasswordHashingFailed(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::internal(err.to_string())
    }
}

// Depuis serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(_: serde_json::Error) -> Self {
        AppError::invalid_input("Invalid JSON data")
    }
}

// Depuis axum::extract::rejection::JsonRejection
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(rejection = %err.body_text(), "JSON body rejected");
        AppError::invalid_input("Invalid JSON data")
    }
}

impl From<FormRejection> for AppError {
    fn from(err: FormRejection) -> Self {
        AppError::invalid_input(err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::invalid_input(err.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::invalid_input(err.body_text())
    }
}

/// Handler de repli pour les méthodes non supportées par une route
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_message_only() {
        let err = AppError::not_found("Object not found");
        assert_eq!(err.to_string(), "Object not found");
    }

    #[test]
    fn not_found_maps_to_404_status() {
        assert_eq!(
            AppError::not_found("test").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn invalid_credentials_maps_to_401_status() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::InvalidCredentials.to_string(), INVALID_CREDENTIALS);
    }

    #[test]
    fn duplicate_maps_to_400_status() {
        assert_eq!(
            AppError::duplicate("UNIQUE constraint failed").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn forbidden_maps_to_403_status() {
        assert_eq!(
            AppError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn internal_error_echoes_text() {
        let err = AppError::internal("disk on fire");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn repository_not_found_becomes_object_not_found() {
        let err = AppError::from(RepositoryError::NotFound("Record not found".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Object not found");
    }

    #[tokio::test]
    async fn method_not_allowed_body_is_json_error() {
        use http_body_util::BodyExt;

        let response = method_not_allowed().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Method not allowed"}));
    }
}
