use std::sync::Arc;

use crate::services::ProjectService;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<ProjectService>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(projects: ProjectService, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            projects: Arc::new(projects),
            jwt_secret: jwt_secret.into(),
        }
    }
}
