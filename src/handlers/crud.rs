//! Handlers génériques, instanciés pour chaque service de table.

use axum::{
    Json,
    extract::{
        FromRef, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use crud_lab_api::{DataResponse, DeleteRequest, ListResponse};

use crate::auth::permissions::Permission;
use crate::auth::session::RequestContext;
use crate::error::AppError;
use crate::pagination::PageQuery;
use crate::response::AppResponse;
use crate::services::crud::{CrudService, JsonWriteService};
use crate::state::AppState;

pub const PUT_REQUIRES_ID: &str = "ID is required for PUT requests";
pub const DELETE_REQUIRES_ID: &str = "ID is required for DELETE requests";

/// GET: liste paginée
pub async fn list<S>(
    State(service): State<S>,
    ctx: RequestContext,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<AppResponse<ListResponse<S::Record>>, AppError>
where
    S: CrudService + FromRef<AppState>,
{
    ctx.require(Permission::ViewData)?;
    let Query(query) = query?;
    Ok(AppResponse::ok(service.list(&query)?))
}

/// POST: création à partir d'un corps JSON
pub async fn create<S>(
    State(service): State<S>,
    ctx: RequestContext,
    body: Result<Json<S::Input>, JsonRejection>,
) -> Result<AppResponse<DataResponse<S::Record>>, AppError>
where
    S: JsonWriteService + FromRef<AppState>,
{
    ctx.require(Permission::AddData)?;
    let Json(input) = body?;
    let record = service.create(input)?;
    Ok(AppResponse::created(DataResponse::new(record)))
}

/// PUT: mise à jour, `id` dans le corps
pub async fn update<S>(
    State(service): State<S>,
    ctx: RequestContext,
    body: Result<Json<S::Input>, JsonRejection>,
) -> Result<AppResponse<DataResponse<S::Record>>, AppError>
where
    S: JsonWriteService + FromRef<AppState>,
{
    ctx.require(Permission::ChangeData)?;
    let Json(input) = body?;
    let id = S::input_id(&input).ok_or_else(|| AppError::invalid_input(PUT_REQUIRES_ID))?;
    let record = service.update(id, input)?;
    Ok(AppResponse::ok(DataResponse::new(record)))
}

/// DELETE: `{"id": ...}` dans le corps, 204 en cas de succès
pub async fn delete<S>(
    State(service): State<S>,
    ctx: RequestContext,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<AppResponse<()>, AppError>
where
    S: CrudService + FromRef<AppState>,
{
    ctx.require(Permission::DeleteData)?;
    let Json(request) = body?;
    let id = request
        .id
        .ok_or_else(|| AppError::invalid_input(DELETE_REQUIRES_ID))?;
    service.delete(id)?;
    Ok(AppResponse::no_content())
}
