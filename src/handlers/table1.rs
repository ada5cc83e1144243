//! Table1: corps JSON ou multipart, et recherche.

use axum::extract::State;
use crud_lab_api::{DataResponse, SearchResponse, Table1Record};

use crate::auth::permissions::Permission;
use crate::auth::session::RequestContext;
use crate::error::AppError;
use crate::handlers::crud::PUT_REQUIRES_ID;
use crate::ingestion::Table1Submission;
use crate::response::AppResponse;
use crate::services::table1::Table1Service;

/// POST /api/table1
pub async fn create(
    State(service): State<Table1Service>,
    ctx: RequestContext,
    submission: Result<Table1Submission, AppError>,
) -> Result<AppResponse<DataResponse<Table1Record>>, AppError> {
    ctx.require(Permission::AddData)?;
    let record = service.create(submission?)?;
    Ok(AppResponse::created(DataResponse::new(record)))
}

/// PUT /api/table1
pub async fn update(
    State(service): State<Table1Service>,
    ctx: RequestContext,
    submission: Result<Table1Submission, AppError>,
) -> Result<AppResponse<DataResponse<Table1Record>>, AppError> {
    ctx.require(Permission::ChangeData)?;
    let submission = submission?;
    let id = submission
        .id()
        .ok_or_else(|| AppError::invalid_input(PUT_REQUIRES_ID))?;
    let record = service.update(id, submission)?;
    Ok(AppResponse::ok(DataResponse::new(record)))
}

/// GET /api/table1/search
pub async fn search(
    State(service): State<Table1Service>,
    ctx: RequestContext,
) -> Result<AppResponse<SearchResponse>, AppError> {
    ctx.require(Permission::ViewData)?;
    let data = service.search()?;
    let count = data.len();
    Ok(AppResponse::ok(SearchResponse {
        data,
        count,
        message: format!("Found {count} records"),
    }))
}
