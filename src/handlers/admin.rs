use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use crud_lab_api::{RoleAssignmentRequest, UserLogRecord, UserWithRole};

use crate::auth::permissions::Permission;
use crate::auth::services::AuthService;
use crate::auth::session::RequestContext;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::services::audit::AuditService;

const RECENT_LOGS: i64 = 100;

/// GET /admin/users
pub async fn list_users(
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
) -> Result<AppResponse<Vec<UserWithRole>>, AppError> {
    ctx.require(Permission::ManageUsers)?;
    Ok(AppResponse::ok(auth_service.list_users_with_roles()?))
}

/// POST /admin/users
pub async fn assign_role(
    State(auth_service): State<AuthService>,
    ctx: RequestContext,
    body: Result<Json<RoleAssignmentRequest>, JsonRejection>,
) -> Result<AppResponse<UserWithRole>, AppError> {
    ctx.require(Permission::ManageUsers)?;
    let Json(request) = body?;
    Ok(AppResponse::ok(auth_service.assign_role(request)?))
}

/// GET /admin/logs
/// Les 100 derniers événements, du plus récent au plus ancien
pub async fn recent_logs(
    State(audit): State<AuditService>,
    ctx: RequestContext,
) -> Result<AppResponse<Vec<UserLogRecord>>, AppError> {
    ctx.require_login()?;
    Ok(AppResponse::ok(audit.recent(RECENT_LOGS)?))
}
