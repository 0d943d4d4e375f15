use uuid::Uuid;

use crate::error::ApiError;

/// Parse the `{id}` path segment, rejecting anything that is not a UUID
pub fn parse_project_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid project id '{}'", raw)))
}
