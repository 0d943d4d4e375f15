use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{validate_key, validate_object_name, ContainerStore, GatewayError};

/// Containers as directories under a root; objects as files beneath them
pub struct FsContainerStore {
    root: PathBuf,
}

impl FsContainerStore {
    /// Use `root` as the container directory, creating it if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| GatewayError::io(format!("Error opening storage root {}", root.display()), e))?;
        Ok(Self { root })
    }

    fn container_path(&self, key: &str) -> Result<PathBuf, GatewayError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ContainerStore for FsContainerStore {
    async fn container_exists(&self, key: &str) -> Result<bool, GatewayError> {
        let path = self.container_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GatewayError::io("Error checking container", e)),
        }
    }

    async fn create_container(&self, key: &str) -> Result<(), GatewayError> {
        let path = self.container_path(key)?;
        match fs::create_dir(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(GatewayError::AlreadyExists(key.to_string())),
            Err(e) => Err(GatewayError::io("Error creating container", e)),
        }
    }

    async fn delete_container(&self, key: &str) -> Result<(), GatewayError> {
        let path = self.container_path(key)?;
        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(GatewayError::Missing(key.to_string())),
            Err(e) => Err(GatewayError::io("Error deleting container", e)),
        }
    }

    async fn put_object(&self, key: &str, name: &str, data: &[u8]) -> Result<(), GatewayError> {
        let container = self.container_path(key)?;
        validate_object_name(name)?;
        if !self.container_exists(key).await? {
            return Err(GatewayError::Missing(key.to_string()));
        }

        let path = container.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::io("Error writing object", e))?;
        }
        fs::write(&path, data)
            .await
            .map_err(|e| GatewayError::io("Error writing object", e))
    }

    async fn list_objects(&self, key: &str) -> Result<Vec<String>, GatewayError> {
        let container = self.container_path(key)?;
        if !self.container_exists(key).await? {
            return Err(GatewayError::Missing(key.to_string()));
        }

        let mut names = Vec::new();
        let mut pending = vec![container.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| GatewayError::io("Error listing container", e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| GatewayError::io("Error listing container", e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| GatewayError::io("Error listing container", e))?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    names.push(object_name(&container, &entry.path()));
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn list_containers(&self) -> Result<Vec<String>, GatewayError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| GatewayError::io("Error listing containers", e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GatewayError::io("Error listing containers", e))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                keys.push(name.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Object name for a file: its path relative to the container, `/`-joined
fn object_name(container: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(container).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageGateway, ROOT_GROUP};
    use std::sync::Arc;

    #[tokio::test]
    async fn container_lifecycle_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContainerStore::open(dir.path().join("containers")).await.unwrap();

        store.create_container("p1").await.unwrap();
        assert!(store.container_exists("p1").await.unwrap());
        assert!(matches!(
            store.create_container("p1").await,
            Err(GatewayError::AlreadyExists(_))
        ));

        store.put_object("p1", "HEAD", b"refs/heads/main").await.unwrap();
        store.put_object("p1", "refs/heads/main", b"0000").await.unwrap();
        assert_eq!(
            store.list_objects("p1").await.unwrap(),
            vec!["HEAD".to_string(), "refs/heads/main".to_string()]
        );
        assert_eq!(store.list_containers().await.unwrap(), vec!["p1".to_string()]);

        store.delete_container("p1").await.unwrap();
        assert!(!store.container_exists("p1").await.unwrap());
        assert!(matches!(store.delete_container("p1").await, Err(GatewayError::Missing(_))));
    }

    #[tokio::test]
    async fn gateway_seeds_scaffold_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContainerStore::open(dir.path()).await.unwrap();
        let gateway = StorageGateway::new(Arc::new(store));

        gateway.create_container("p2").await.unwrap();

        let head = tokio::fs::read_to_string(dir.path().join("p2").join("HEAD")).await.unwrap();
        assert_eq!(head, "refs/heads/main");
        let content = gateway.get_content("p2").await.unwrap();
        assert_eq!(content[ROOT_GROUP], vec!["HEAD", "README.md"]);
    }

    #[tokio::test]
    async fn rejects_path_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContainerStore::open(dir.path()).await.unwrap();
        store.create_container("p3").await.unwrap();

        assert!(matches!(store.create_container("..").await, Err(GatewayError::InvalidKey(_))));
        assert!(matches!(
            store.put_object("p3", "../escape", b"x").await,
            Err(GatewayError::InvalidKey(_))
        ));
    }
}
