use std::sync::Arc;

use crate::database::MemoryProjectRepository;
use crate::services::{ProjectService, Reconciler};
use crate::storage::{MemoryContainerStore, StorageGateway};

/// Project service wired to in-memory stores, with handles kept for
/// fault injection and assertions
pub struct Fixture {
    pub repo: Arc<MemoryProjectRepository>,
    pub store: Arc<MemoryContainerStore>,
    pub service: ProjectService,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryProjectRepository::new());
        let store = Arc::new(MemoryContainerStore::new());
        let service = ProjectService::new(repo.clone(), StorageGateway::new(store.clone()));
        Self { repo, store, service }
    }

    pub fn storage(&self) -> StorageGateway {
        StorageGateway::new(self.store.clone())
    }

    pub fn reconciler(&self, pending_grace_secs: u64) -> Reconciler {
        Reconciler::new(self.repo.clone(), self.storage(), pending_grace_secs)
    }
}
