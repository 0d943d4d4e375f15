use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::{DatabaseError, Project, ProjectRepository, ProjectStatus};
use crate::storage::{ContainerContent, GatewayError, StorageGateway};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Validation failed: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Project with ID {0} not found.")]
    NotFound(Uuid),

    #[error("No projects found for owner {0}.")]
    NoneOwned(Uuid),

    #[error("Database error: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Storage container error")]
    Container(#[from] GatewayError),
}

impl ProjectError {
    /// Error messages from outermost to innermost cause
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
        messages
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProjectError::NotFound(_) | ProjectError::NoneOwned(_))
    }
}

/// Caller-supplied fields for a new project
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Field-level update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectChanges {
    fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            project.description = description;
        }
    }
}

fn validate_fields(name: &str, description: &str) -> Result<(), ProjectError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProjectError::Validation {
            field: "name",
            message: "Project name cannot be empty.".to_string(),
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProjectError::Validation {
            field: "name",
            message: format!("Project name must be at most {} characters.", MAX_NAME_LEN),
        });
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ProjectError::Validation {
            field: "description",
            message: format!("Project description must be at most {} characters.", MAX_DESCRIPTION_LEN),
        });
    }
    Ok(())
}

/// Owner-scoped project CRUD over the relational store and storage gateway
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    storage: StorageGateway,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>, storage: StorageGateway) -> Self {
        Self { projects, storage }
    }

    pub async fn list_projects(&self, owner_id: Uuid) -> Result<Vec<Project>, ProjectError> {
        let projects = self.projects.list_by_owner(owner_id).await?;
        if projects.is_empty() {
            return Err(ProjectError::NoneOwned(owner_id));
        }
        Ok(projects)
    }

    pub async fn get_project(&self, id: Uuid, owner_id: Uuid) -> Result<Project, ProjectError> {
        self.projects
            .find_owned(id, owner_id)
            .await?
            .ok_or(ProjectError::NotFound(id))
    }

    /// Insert the row as pending, create and seed its container, then activate.
    ///
    /// A container failure leaves the committed row pending; nothing is rolled back.
    pub async fn create_project(&self, data: NewProject, owner_id: Uuid) -> Result<Project, ProjectError> {
        self.create_with_id(Uuid::new_v4(), data, owner_id).await
    }

    pub(crate) async fn create_with_id(
        &self,
        id: Uuid,
        data: NewProject,
        owner_id: Uuid,
    ) -> Result<Project, ProjectError> {
        validate_fields(&data.name, &data.description)?;

        let mut project = Project::new_pending(owner_id, data.name.trim().to_string(), data.description);
        project.id = id;

        let mut project = self.projects.insert(&project).await.map_err(|e| {
            tracing::error!("Failed to insert project for owner {}: {}", owner_id, e);
            ProjectError::Persistence(e)
        })?;
        tracing::info!("Project {} created successfully with ID {}", project.name, project.id);

        if let Err(e) = self.storage.create_container(&project.container_key()).await {
            tracing::warn!("Project {} committed without a container: {}", project.id, e);
            return Err(ProjectError::Container(e));
        }

        if !self.projects.set_status(project.id, owner_id, ProjectStatus::Active).await? {
            // Row vanished between insert and activation
            return Err(ProjectError::NotFound(project.id));
        }
        project.status = ProjectStatus::Active;
        Ok(project)
    }

    /// Merge `changes` into the owned row and persist it
    pub async fn update_project(
        &self,
        id: Uuid,
        changes: ProjectChanges,
        owner_id: Uuid,
    ) -> Result<Project, ProjectError> {
        let mut project = self.get_project(id, owner_id).await?;
        changes.apply(&mut project);
        validate_fields(&project.name, &project.description)?;
        project.updated_at = Utc::now();

        self.projects
            .update_owned(&project)
            .await?
            .ok_or(ProjectError::NotFound(id))
    }

    /// Delete the row, then the container. A container failure is reported
    /// even though the row is already gone.
    pub async fn delete_project(&self, id: Uuid, owner_id: Uuid) -> Result<(), ProjectError> {
        let project = self.get_project(id, owner_id).await?;

        if !self.projects.delete_owned(project.id, owner_id).await? {
            return Err(ProjectError::NotFound(id));
        }
        tracing::info!("Deleted project row {}", project.id);

        if let Err(e) = self.storage.delete_container(&project.container_key()).await {
            tracing::warn!("Project {} deleted but its container remains: {}", project.id, e);
            return Err(ProjectError::Container(e));
        }
        Ok(())
    }

    pub async fn get_project_content(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<(Project, ContainerContent), ProjectError> {
        let project = self.get_project(id, owner_id).await?;
        let content = self.storage.get_content(&project.container_key()).await?;
        Ok((project, content))
    }

    /// Liveness of both backing stores
    pub async fn health(&self) -> (Result<(), DatabaseError>, Result<(), GatewayError>) {
        (self.projects.ping().await, self.storage.ping().await)
    }
}
