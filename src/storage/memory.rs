use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{validate_key, validate_object_name, ContainerStore, GatewayError};

/// Container store kept entirely in process memory
#[derive(Default)]
pub struct MemoryContainerStore {
    containers: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    offline: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryContainerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with an I/O error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make object writes fail while container creation keeps working
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw object bytes, for assertions in tests
    pub async fn object(&self, key: &str, name: &str) -> Option<Vec<u8>> {
        self.containers.read().await.get(key).and_then(|c| c.get(name).cloned())
    }

    fn check_online(&self, context: &str) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::io(context, "storage service unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerStore for MemoryContainerStore {
    async fn container_exists(&self, key: &str) -> Result<bool, GatewayError> {
        self.check_online("Error checking container")?;
        validate_key(key)?;
        Ok(self.containers.read().await.contains_key(key))
    }

    async fn create_container(&self, key: &str) -> Result<(), GatewayError> {
        self.check_online("Error creating container")?;
        validate_key(key)?;
        let mut containers = self.containers.write().await;
        if containers.contains_key(key) {
            return Err(GatewayError::AlreadyExists(key.to_string()));
        }
        containers.insert(key.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_container(&self, key: &str) -> Result<(), GatewayError> {
        self.check_online("Error deleting container")?;
        validate_key(key)?;
        match self.containers.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(GatewayError::Missing(key.to_string())),
        }
    }

    async fn put_object(&self, key: &str, name: &str, data: &[u8]) -> Result<(), GatewayError> {
        self.check_online("Error writing object")?;
        validate_key(key)?;
        validate_object_name(name)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::io("Error writing object", format!("write to '{}/{}' rejected", key, name)));
        }
        let mut containers = self.containers.write().await;
        let container = containers
            .get_mut(key)
            .ok_or_else(|| GatewayError::Missing(key.to_string()))?;
        container.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn list_objects(&self, key: &str) -> Result<Vec<String>, GatewayError> {
        self.check_online("Error listing container")?;
        validate_key(key)?;
        let containers = self.containers.read().await;
        let container = containers
            .get(key)
            .ok_or_else(|| GatewayError::Missing(key.to_string()))?;
        Ok(container.keys().cloned().collect())
    }

    async fn list_containers(&self) -> Result<Vec<String>, GatewayError> {
        self.check_online("Error listing containers")?;
        let mut keys: Vec<String> = self.containers.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
