use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::{DatabaseError, ProjectRepository, ProjectStatus};
use crate::storage::{GatewayError, StorageGateway};

/// Outcome of one reconciliation sweep
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileReport {
    /// Pending rows whose container already existed
    pub activated: Vec<Uuid>,
    /// Pending rows whose container had to be created
    pub recreated: Vec<Uuid>,
    /// Containers that had no project row
    pub removed_containers: Vec<String>,
    pub failures: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] GatewayError),
}

/// Repairs rows left pending and containers left orphaned by partial failures
pub struct Reconciler {
    projects: Arc<dyn ProjectRepository>,
    storage: StorageGateway,
    pending_grace: Duration,
}

impl Reconciler {
    pub fn new(projects: Arc<dyn ProjectRepository>, storage: StorageGateway, pending_grace_secs: u64) -> Self {
        Self {
            projects,
            storage,
            pending_grace: Duration::seconds(pending_grace_secs as i64),
        }
    }

    /// Run a single sweep. Listing failures abort; per-item failures are recorded.
    pub async fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        let cutoff = Utc::now() - self.pending_grace;
        for project in self.projects.list_pending(cutoff).await? {
            let key = project.container_key();
            let existed = match self.storage.container_exists(&key).await {
                Ok(true) => {
                    // Creation may have died mid-scaffold
                    self.storage.seed_scaffold(&key).await.map(|_| true)
                }
                Ok(false) => self.storage.create_container(&key).await.map(|_| false),
                Err(e) => Err(e),
            };

            let existed = match existed {
                Ok(existed) => existed,
                Err(e) => {
                    tracing::warn!("Reconcile: container for pending project {} failed: {}", project.id, e);
                    report.failures.push(format!("project {}: {}", project.id, e));
                    continue;
                }
            };

            match self
                .projects
                .set_status(project.id, project.owner_id, ProjectStatus::Active)
                .await
            {
                Ok(true) if existed => report.activated.push(project.id),
                Ok(true) => report.recreated.push(project.id),
                // Deleted while we were working; its container is now the orphan pass's problem
                Ok(false) => {}
                Err(e) => report.failures.push(format!("project {}: {}", project.id, e)),
            }
        }

        // Containers are created only after their row is inserted, so listing
        // containers before snapshotting ids keeps in-flight creates out of the orphan set
        let containers = self.storage.list_containers().await?;
        let known = self.projects.all_ids().await?;
        for key in containers {
            let Ok(id) = Uuid::parse_str(&key) else {
                tracing::debug!("Reconcile: skipping foreign container {}", key);
                continue;
            };
            if known.contains(&id) {
                continue;
            }
            match self.storage.delete_container(&key).await {
                Ok(()) => report.removed_containers.push(key),
                Err(e) => report.failures.push(format!("container {}: {}", key, e)),
            }
        }

        tracing::info!(
            "Reconcile finished: {} activated, {} recreated, {} containers removed, {} failures",
            report.activated.len(),
            report.recreated.len(),
            report.removed_containers.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
