// src/handlers/auth.rs
//! Routes montées sous chaque préfixe de sous-application.

use axum::{
    Extension, Form,
    extract::{State, rejection::FormRejection},
};
use crud_lab_api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RegisterRequest, RegisterResponse,
};

use crate::auth::services::AuthService;
use crate::auth::session::{RequestContext, clear_session_cookie, session_cookie};
use crate::auth::validation::SubApp;
use crate::error::AppError;
use crate::response::AppResponse;

/// POST /{app}/register
/// Inscription d'un nouvel utilisateur
pub async fn register(
    Extension(app): Extension<SubApp>,
    State(auth_service): State<AuthService>,
    form: Result<Form<RegisterRequest>, FormRejection>,
) -> Result<AppResponse<RegisterResponse>, AppError> {
    let Form(payload) = form?;
    let user = auth_service.register(app, payload)?;
    Ok(AppResponse::created(RegisterResponse {
        message: "Registration successful.".to_string(),
        user,
    }))
}

/// POST /{app}/login
/// Connexion: pose le cookie `sessionid`
pub async fn login(
    Extension(app): Extension<SubApp>,
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<AppResponse<LoginResponse>, AppError> {
    let Form(payload) = form?;
    let (response, session) = auth_service.login(app, payload, &ctx)?;

    let cookie = session_cookie(
        &session.id,
        auth_service.session_ttl_hours(),
        auth_service.secure_cookies(),
    )?;
    Ok(AppResponse::ok(response).with_cookie(cookie))
}

/// POST /{app}/logout
pub async fn logout(
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
) -> Result<AppResponse<MessageResponse>, AppError> {
    auth_service.logout(&ctx)?;
    Ok(
        AppResponse::ok(MessageResponse::new("You have been logged out."))
            .with_cookie(clear_session_cookie(auth_service.secure_cookies())),
    )
}

/// GET /{app}/profile
pub async fn profile(
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
) -> Result<AppResponse<ProfileResponse>, AppError> {
    Ok(AppResponse::ok(auth_service.profile(&ctx)?))
}

/// POST /{app}/password
pub async fn change_password(
    Extension(app): Extension<SubApp>,
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
    form: Result<Form<ChangePasswordRequest>, FormRejection>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    ctx.require_login()?;
    let Form(payload) = form?;
    auth_service.change_password(app, &ctx, payload)?;
    Ok(AppResponse::ok(MessageResponse::new(
        "Your password was successfully updated.",
    )))
}
