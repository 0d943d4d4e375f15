// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::IdentityError;
use crate::services::ProjectError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),
    InvalidIdentity(String),
    // A backing store refused the operation; `errors` lists the cause chain
    ResourceFailure {
        message: String,
        errors: Vec<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceFailure { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::InvalidIdentity(msg) => msg,
            ApiError::ResourceFailure { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            ApiError::ResourceFailure { message, errors } => {
                json!({
                    "error": true,
                    "message": message,
                    "code": self.error_code(),
                    "errors": errors
                })
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::InvalidIdentity(_) => "INVALID_IDENTITY",
            ApiError::ResourceFailure { .. } => "RESOURCE_FAILURE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        tracing::warn!("Rejected caller identity: {}", err);
        ApiError::InvalidIdentity(err.to_string())
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::Validation { field, message } => {
                let field_errors = HashMap::from([(field.to_string(), message.clone())]);
                ApiError::validation_error(message, Some(field_errors))
            }
            ProjectError::NotFound(_) | ProjectError::NoneOwned(_) => ApiError::not_found(err.to_string()),
            ProjectError::Persistence(ref db) => {
                tracing::error!("Project persistence failure: {}", db);
                ApiError::ResourceFailure {
                    message: "Database error".to_string(),
                    errors: err.messages(),
                }
            }
            ProjectError::Container(ref gateway) => {
                tracing::error!("Project storage failure: {}", gateway);
                ApiError::ResourceFailure {
                    message: format!("Error in storage container: {}", gateway),
                    errors: err.messages(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseError;
    use crate::storage::GatewayError;
    use uuid::Uuid;

    #[test]
    fn project_errors_map_to_documented_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(ApiError::from(ProjectError::NotFound(id)).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ProjectError::NoneOwned(id)).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ProjectError::Validation { field: "name", message: "x".into() }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ProjectError::Persistence(DatabaseError::QueryError("boom".into()))).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(IdentityError::MissingClaim).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_failures_name_the_field() {
        let err = ApiError::from(ProjectError::Validation {
            field: "description",
            message: "Project description must be at most 2000 characters.".into(),
        });
        let body = err.to_json();

        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Project description must be at most 2000 characters.");
        assert_eq!(body["field_errors"]["description"], "Project description must be at most 2000 characters.");
    }

    #[test]
    fn container_failures_list_their_causes() {
        let err = ApiError::from(ProjectError::Container(GatewayError::AlreadyExists("abc".into())));
        let body = err.to_json();

        assert_eq!(body["code"], "RESOURCE_FAILURE");
        assert_eq!(body["message"], "Error in storage container: Container with name 'abc' already exists.");
        assert_eq!(body["errors"][1], "Container with name 'abc' already exists.");
    }
}
