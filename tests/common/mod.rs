#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use brew_projects::auth::{generate_jwt, Claims};
use brew_projects::config::SecurityConfig;
use brew_projects::database::MemoryProjectRepository;
use brew_projects::services::{ProjectService, Reconciler};
use brew_projects::storage::{MemoryContainerStore, StorageGateway};
use brew_projects::{app, AppState};

pub const SECRET: &str = "test-secret";

/// Router over in-memory stores; the store handles stay reachable for
/// fault injection and direct assertions.
pub struct TestApp {
    pub repo: Arc<MemoryProjectRepository>,
    pub store: Arc<MemoryContainerStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryProjectRepository::new());
        let store = Arc::new(MemoryContainerStore::new());
        let service = ProjectService::new(repo.clone(), StorageGateway::new(store.clone()));

        let security = SecurityConfig {
            enable_cors: false,
            cors_origins: Vec::new(),
            jwt_secret: SECRET.to_string(),
            jwt_expiry_hours: 1,
        };
        let router = app(AppState::new(service, SECRET), &security);

        Self { repo, store, router }
    }

    pub fn reconciler(&self, pending_grace_secs: u64) -> Reconciler {
        Reconciler::new(
            self.repo.clone(),
            StorageGateway::new(self.store.clone()),
            pending_grace_secs,
        )
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, body })
    }
}

pub fn token_for(owner: Uuid) -> String {
    token_with_sub(Some(owner.to_string()))
}

pub fn token_with_sub(sub: Option<String>) -> String {
    generate_jwt(&Claims::new(sub, 1), SECRET).expect("sign test token")
}
