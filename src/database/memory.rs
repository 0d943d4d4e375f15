use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, ProjectStatus};
use crate::database::repository::ProjectRepository;

/// In-process project table for tests and database-less development runs
#[derive(Default)]
pub struct MemoryProjectRepository {
    rows: RwLock<HashMap<Uuid, Project>>,
    offline: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails as if the connection dropped
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make deletes fail while reads keep working
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Unscoped lookup, for assertions in tests
    pub async fn get(&self, id: Uuid) -> Option<Project> {
        self.rows.read().await.get(&id).cloned()
    }

    fn check_online(&self) -> Result<(), DatabaseError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        let mut owned: Vec<Project> = rows.values().filter(|p| p.owner_id == owner_id).cloned().collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Project>, DatabaseError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|p| p.owner_id == owner_id).cloned())
    }

    async fn insert(&self, project: &Project) -> Result<Project, DatabaseError> {
        self.check_online()?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&project.id) {
            return Err(DatabaseError::QueryError(format!(
                "duplicate key value violates unique constraint \"projects_pkey\" ({})",
                project.id
            )));
        }
        rows.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn update_owned(&self, project: &Project) -> Result<Option<Project>, DatabaseError> {
        self.check_online()?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(&project.id) {
            Some(row) if row.owner_id == project.owner_id => {
                row.name = project.name.clone();
                row.description = project.description.clone();
                row.updated_at = project.updated_at;
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_status(&self, id: Uuid, owner_id: Uuid, status: ProjectStatus) -> Result<bool, DatabaseError> {
        self.check_online()?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) if row.owner_id == owner_id => {
                row.status = status;
                row.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DatabaseError> {
        self.check_online()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError(format!("delete of project {} rejected", id)));
        }
        let mut rows = self.rows.write().await;
        if rows.get(&id).is_some_and(|p| p.owner_id == owner_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_pending(&self, created_before: DateTime<Utc>) -> Result<Vec<Project>, DatabaseError> {
        self.check_online()?;
        let rows = self.rows.read().await;
        let mut pending: Vec<Project> = rows
            .values()
            .filter(|p| p.status == ProjectStatus::Pending && p.created_at < created_before)
            .cloned()
            .collect();
        pending.sort_by_key(|p| p.created_at);
        Ok(pending)
    }

    async fn all_ids(&self) -> Result<HashSet<Uuid>, DatabaseError> {
        self.check_online()?;
        Ok(self.rows.read().await.keys().copied().collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn owner_scoping_hides_foreign_rows() {
        let repo = MemoryProjectRepository::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let project = repo
            .insert(&Project::new_pending(owner, "Demo".into(), "d".into()))
            .await
            .unwrap();

        assert!(repo.find_owned(project.id, owner).await.unwrap().is_some());
        assert!(repo.find_owned(project.id, stranger).await.unwrap().is_none());
        assert!(!repo.delete_owned(project.id, stranger).await.unwrap());
        assert!(!repo.set_status(project.id, stranger, ProjectStatus::Active).await.unwrap());
        assert!(repo.list_by_owner(stranger).await.unwrap().is_empty());
        assert!(repo.delete_owned(project.id, owner).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let repo = MemoryProjectRepository::new();
        let project = Project::new_pending(Uuid::new_v4(), "Demo".into(), String::new());
        repo.insert(&project).await.unwrap();
        assert!(matches!(repo.insert(&project).await, Err(DatabaseError::QueryError(_))));
    }

    #[tokio::test]
    async fn offline_repository_fails_every_call() {
        let repo = MemoryProjectRepository::new();
        repo.set_offline(true);
        assert!(repo.ping().await.is_err());
        assert!(repo.list_by_owner(Uuid::new_v4()).await.is_err());
        repo.set_offline(false);
        assert!(repo.ping().await.is_ok());
    }

    #[tokio::test]
    async fn pending_listing_respects_cutoff() {
        let repo = MemoryProjectRepository::new();
        let mut old = Project::new_pending(Uuid::new_v4(), "Old".into(), String::new());
        old.created_at = Utc::now() - chrono::Duration::minutes(10);
        repo.insert(&old).await.unwrap();
        repo.insert(&Project::new_pending(Uuid::new_v4(), "Fresh".into(), String::new()))
            .await
            .unwrap();

        let cutoff = Utc::now() - chrono::Duration::minutes(1);
        let pending = repo.list_pending(cutoff).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, old.id);
    }
}
