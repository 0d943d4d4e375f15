use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::api::ProjectResponseDto;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::services::ProjectChanges;
use crate::state::AppState;

use super::utils::parse_project_id;

/// GET /projects/:id - One owned project
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<ProjectResponseDto> {
    let id = parse_project_id(&id)?;
    let project = state.projects.get_project(id, caller.id()).await?;
    Ok(ApiResponse::success(project.into()))
}

/// PUT /projects/:id - Merge `name`/`description` into an owned project
pub async fn put(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<ProjectChanges>, JsonRejection>,
) -> ApiResult<ProjectResponseDto> {
    let id = parse_project_id(&id)?;
    let Json(changes) = payload?;
    let project = state.projects.update_project(id, changes, caller.id()).await?;
    Ok(ApiResponse::success(project.into()))
}

/// DELETE /projects/:id - Remove the row, then the container
pub async fn delete(State(state): State<AppState>, caller: Caller, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_project_id(&id)?;
    state.projects.delete_project(id, caller.id()).await?;
    Ok(ApiResponse::no_content())
}
