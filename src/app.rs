use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment, SecurityConfig, StorageBackend};
use crate::database::{DatabaseManager, MemoryProjectRepository, PgProjectRepository, ProjectRepository};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::{ProjectService, Reconciler};
use crate::state::AppState;
use crate::storage::{ContainerStore, FsContainerStore, MemoryContainerStore, StorageGateway};

/// Backing stores selected by configuration
pub struct Backends {
    pub projects: Arc<dyn ProjectRepository>,
    pub storage: StorageGateway,
    /// Whether `projects` outlives the process
    durable_projects: bool,
}

impl Backends {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let durable_projects = config.database.url.is_some();
        let projects: Arc<dyn ProjectRepository> = match config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                Arc::new(PgProjectRepository::new(pool))
            }
            None if matches!(config.environment, Environment::Development) => {
                tracing::warn!("DATABASE_URL not set; projects are kept in memory and lost on exit");
                Arc::new(MemoryProjectRepository::new())
            }
            None => anyhow::bail!("DATABASE_URL must be set outside development"),
        };

        let store: Arc<dyn ContainerStore> = match config.storage.backend {
            StorageBackend::Filesystem => {
                tracing::info!("Storage containers under {}", config.storage.root.display());
                Arc::new(FsContainerStore::open(&config.storage.root).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Storage containers are kept in memory and lost on exit");
                Arc::new(MemoryContainerStore::new())
            }
        };

        Ok(Self {
            projects,
            storage: StorageGateway::new(store),
            durable_projects,
        })
    }

    pub fn project_service(&self) -> ProjectService {
        ProjectService::new(self.projects.clone(), self.storage.clone())
    }

    /// Sweeper over the configured stores.
    ///
    /// Refused for the in-memory project table: it starts empty, so every
    /// persisted container would look orphaned.
    pub fn reconciler(&self, pending_grace_secs: u64) -> anyhow::Result<Reconciler> {
        if !self.durable_projects {
            anyhow::bail!("reconcile requires DATABASE_URL; the in-memory project table has no rows to check against");
        }
        Ok(Reconciler::new(self.projects.clone(), self.storage.clone(), pending_grace_secs))
    }
}

/// Full router: public endpoints, protected /projects, global layers
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected
        .merge(project_routes(state.clone()))
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn project_routes(state: AppState) -> Router<AppState> {
    use handlers::projects;

    Router::new()
        .route("/projects", get(projects::projects_get).post(projects::projects_post))
        .route(
            "/projects/:id",
            get(projects::project_get)
                .put(projects::project_put)
                .delete(projects::project_delete),
        )
        .route("/projects/:id/content", get(projects::project_content_get))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Brew Projects API",
        "version": version,
        "description": "Projects with per-project storage containers",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "projects": "/projects[/:id[/content]] (protected - bearer token)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let (database, storage) = state.projects.health().await;

    let status_of = |ok: bool| if ok { "ok" } else { "unavailable" };
    let healthy = database.is_ok() && storage.is_ok();

    let mut body = json!({
        "status": if healthy { "ok" } else { "degraded" },
        "timestamp": now,
        "database": status_of(database.is_ok()),
        "storage": status_of(storage.is_ok()),
    });
    if let Err(e) = &database {
        tracing::error!("Health check: database unavailable: {}", e);
        body["database_error"] = json!(e.to_string());
    }
    if let Err(e) = &storage {
        tracing::error!("Health check: storage unavailable: {}", e);
        body["storage_error"] = json!(e.to_string());
    }

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body))
}
