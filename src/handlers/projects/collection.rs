use axum::{extract::State, extract::rejection::JsonRejection, Json};

use crate::api::ProjectResponseDto;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::services::NewProject;
use crate::state::AppState;

/// GET /projects - Every project owned by the caller
pub async fn get(State(state): State<AppState>, caller: Caller) -> ApiResult<Vec<ProjectResponseDto>> {
    let projects = state.projects.list_projects(caller.id()).await?;
    let dtos = projects.into_iter().map(ProjectResponseDto::from).collect();
    Ok(ApiResponse::success(dtos))
}

/// POST /projects - Create a project and its storage container
///
/// The owner is always the caller; an `ownerId` in the body is ignored.
pub async fn post(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<ProjectResponseDto> {
    let Json(new_project) = payload?;
    let project = state.projects.create_project(new_project, caller.id()).await?;
    Ok(ApiResponse::created(project.into()))
}
