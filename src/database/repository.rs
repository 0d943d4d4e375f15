use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Project, ProjectStatus};

/// Owner-scoped access to the `projects` table.
///
/// Every read and write used on the request path takes the `(id, owner_id)`
/// pair and the store enforces the conjunction. `list_pending` and `all_ids`
/// exist only for the reconciliation sweep.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, DatabaseError>;

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Project>, DatabaseError>;

    async fn insert(&self, project: &Project) -> Result<Project, DatabaseError>;

    /// Writes `name`, `description` and `updated_at`. `None` when no owned row matched.
    async fn update_owned(&self, project: &Project) -> Result<Option<Project>, DatabaseError>;

    /// Returns whether an owned row was changed
    async fn set_status(&self, id: Uuid, owner_id: Uuid, status: ProjectStatus) -> Result<bool, DatabaseError>;

    /// Returns whether an owned row was removed
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DatabaseError>;

    async fn list_pending(&self, created_before: DateTime<Utc>) -> Result<Vec<Project>, DatabaseError>;

    async fn all_ids(&self) -> Result<HashSet<Uuid>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const COLUMNS: &str = "id, owner_id, name, description, status, created_at, updated_at";

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE owner_id = $1 ORDER BY created_at, id", COLUMNS);
        let rows = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1 AND owner_id = $2", COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, project: &Project) -> Result<Project, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO projects (id, owner_id, name, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(project.owner_id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.status.as_str())
            .bind(project.created_at)
            .bind(project.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_owned(&self, project: &Project) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE projects
            SET name = $3, description = $4, updated_at = $5
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(project.owner_id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_status(&self, id: Uuid, owner_id: Uuid, status: ProjectStatus) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE projects SET status = $3, updated_at = now() WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pending(&self, created_before: DateTime<Utc>) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE status = $1 AND created_at < $2 ORDER BY created_at",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Project>(&sql)
            .bind(ProjectStatus::Pending.as_str())
            .bind(created_before)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn all_ids(&self) -> Result<HashSet<Uuid>, DatabaseError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM projects")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
