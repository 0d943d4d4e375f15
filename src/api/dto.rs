use serde::Serialize;
use uuid::Uuid;

use crate::database::Project;
use crate::storage::ContainerContent;

/// Public wire shape of a project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponseDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<Project> for ProjectResponseDto {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            owner_id: project.owner_id,
            name: project.name,
            description: project.description,
        }
    }
}

/// Project plus its container listing grouped by first path segment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContentResponseDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub dictionary: ContainerContent,
}

impl ProjectContentResponseDto {
    pub fn new(project: Project, dictionary: ContainerContent) -> Self {
        Self {
            id: project.id,
            owner_id: project.owner_id,
            name: project.name,
            description: project.description,
            dictionary,
        }
    }
}
