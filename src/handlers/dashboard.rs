use axum::extract::State;
use crud_lab_api::DashboardResponse;

use crate::auth::permissions::Permission;
use crate::auth::session::RequestContext;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::services::dashboard::DashboardService;

/// GET /dashboard
pub async fn dashboard(
    State(service): State<DashboardService>,
    ctx: RequestContext,
) -> Result<AppResponse<DashboardResponse>, AppError> {
    ctx.require(Permission::ViewData)?;
    Ok(AppResponse::ok(service.counts()?))
}
