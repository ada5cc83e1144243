use axum::extract::State;
use crud_lab_api::DarkModeResponse;

use crate::auth::services::AuthService;
use crate::auth::session::{RequestContext, session_cookie};
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /preferences/dark-mode
pub async fn dark_mode(ctx: RequestContext) -> AppResponse<DarkModeResponse> {
    AppResponse::ok(DarkModeResponse {
        dark_mode: ctx.dark_mode(),
        status: None,
    })
}

/// POST /preferences/dark-mode/toggle
/// Ouvre une session anonyme si le client n'en a pas encore
pub async fn toggle_dark_mode(
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
) -> Result<AppResponse<DarkModeResponse>, AppError> {
    let (session, created) = auth_service.toggle_dark_mode(&ctx)?;

    let response = AppResponse::ok(DarkModeResponse {
        dark_mode: session.dark_mode,
        status: Some("success".to_string()),
    });
    if created {
        let cookie = session_cookie(
            &session.id,
            auth_service.session_ttl_hours(),
            auth_service.secure_cookies(),
        )?;
        return Ok(response.with_cookie(cookie));
    }
    Ok(response)
}
