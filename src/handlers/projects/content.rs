use axum::extract::{Path, State};

use crate::api::ProjectContentResponseDto;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;

use super::utils::parse_project_id;

/// GET /projects/:id/content - Project with its grouped container listing
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<ProjectContentResponseDto> {
    let id = parse_project_id(&id)?;
    let (project, dictionary) = state.projects.get_project_content(id, caller.id()).await?;
    Ok(ApiResponse::success(ProjectContentResponseDto::new(project, dictionary)))
}
