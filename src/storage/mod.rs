//! Per-project storage containers.
//!
//! A container is a flat namespace of named objects keyed by the project id.
//! Backends implement [`ContainerStore`]; [`StorageGateway`] layers the
//! project semantics on top (collision check, scaffold seeding, content
//! grouping).

pub mod filesystem;
pub mod memory;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub use filesystem::FsContainerStore;
pub use memory::MemoryContainerStore;

/// Group key for objects stored at the top level of a container
pub const ROOT_GROUP: &str = "root";

/// Objects written into every freshly created container
pub const SCAFFOLD: [(&str, &str); 2] = [
    ("HEAD", "refs/heads/main"),
    ("README.md", "Current README content from the latest commit"),
];

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Container with name '{0}' already exists.")]
    AlreadyExists(String),

    #[error("Container with name '{0}' does not exist.")]
    Missing(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

impl GatewayError {
    pub fn io(context: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        GatewayError::Io {
            context: context.into(),
            message: cause.to_string(),
        }
    }
}

/// Raw container operations offered by a storage backend
#[async_trait]
pub trait ContainerStore: Send + Sync {
    async fn container_exists(&self, key: &str) -> Result<bool, GatewayError>;

    /// Creates an empty container. Fails with `AlreadyExists` on collision.
    async fn create_container(&self, key: &str) -> Result<(), GatewayError>;

    /// Removes a container and everything in it. Fails with `Missing` if absent.
    async fn delete_container(&self, key: &str) -> Result<(), GatewayError>;

    /// Writes (or overwrites) one object
    async fn put_object(&self, key: &str, name: &str, data: &[u8]) -> Result<(), GatewayError>;

    /// Names of every object in the container, `/`-separated
    async fn list_objects(&self, key: &str) -> Result<Vec<String>, GatewayError>;

    async fn list_containers(&self) -> Result<Vec<String>, GatewayError>;

    async fn ping(&self) -> Result<(), GatewayError> {
        self.list_containers().await.map(|_| ())
    }
}

/// Objects of one container grouped by their first path segment
pub type ContainerContent = BTreeMap<String, Vec<String>>;

/// Project-level facade over a [`ContainerStore`]
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ContainerStore>,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ContainerStore>) -> Self {
        Self { store }
    }

    /// Create the container for `key` and seed the scaffold objects
    pub async fn create_container(&self, key: &str) -> Result<(), GatewayError> {
        if self.store.container_exists(key).await? {
            return Err(GatewayError::AlreadyExists(key.to_string()));
        }

        self.store.create_container(key).await?;
        self.seed_scaffold(key).await?;

        info!("Created storage container {}", key);
        Ok(())
    }

    /// Write the scaffold objects, overwriting any existing copies
    pub async fn seed_scaffold(&self, key: &str) -> Result<(), GatewayError> {
        for (name, body) in SCAFFOLD {
            self.store
                .put_object(key, name, body.as_bytes())
                .await
                .map_err(|e| match e {
                    GatewayError::Io { message, .. } => {
                        GatewayError::io("Error setting up container scaffold", message)
                    }
                    other => other,
                })?;
        }
        debug!("Seeded scaffold into container {}", key);
        Ok(())
    }

    pub async fn delete_container(&self, key: &str) -> Result<(), GatewayError> {
        self.store.delete_container(key).await?;
        info!("Deleted storage container {}", key);
        Ok(())
    }

    pub async fn container_exists(&self, key: &str) -> Result<bool, GatewayError> {
        self.store.container_exists(key).await
    }

    pub async fn get_content(&self, key: &str) -> Result<ContainerContent, GatewayError> {
        let names = self.store.list_objects(key).await?;
        Ok(group_content(names))
    }

    pub async fn list_containers(&self) -> Result<Vec<String>, GatewayError> {
        self.store.list_containers().await
    }

    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.store.ping().await
    }
}

/// Group object names by first path segment.
///
/// Names without `/` land under [`ROOT_GROUP`]. Names with `/` land under
/// their first segment with the rest of the path as the leaf; deeper paths
/// are not split further.
pub fn group_content<I>(names: I) -> ContainerContent
where
    I: IntoIterator<Item = String>,
{
    let mut groups = ContainerContent::new();
    for name in names {
        let (group, leaf) = match name.split_once('/') {
            Some((first, rest)) => (first.to_string(), rest.to_string()),
            None => (ROOT_GROUP.to_string(), name),
        };
        groups.entry(group).or_default().push(leaf);
    }
    for leaves in groups.values_mut() {
        leaves.sort();
    }
    groups
}

/// Container keys become directory names, so only a safe alphabet is allowed
pub(crate) fn validate_key(key: &str) -> Result<(), GatewayError> {
    let ok = !key.is_empty()
        && key.len() <= 128
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(GatewayError::InvalidKey(key.to_string()))
    }
}

pub(crate) fn validate_object_name(name: &str) -> Result<(), GatewayError> {
    let ok = !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && name.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    if ok {
        Ok(())
    } else {
        Err(GatewayError::InvalidKey(name.to_string()))
    }
}
