use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::auth::{resolve_caller_identity, Claims};
use crate::error::ApiError;

/// Owner identity of the authenticated caller.
///
/// Resolved once per request from the claims the JWT middleware stored;
/// handlers receive it as an explicit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

impl Caller {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<Claims>().ok_or_else(|| {
            tracing::error!("Caller extractor used on a route without JWT middleware");
            ApiError::internal_server_error("Authentication context missing")
        })?;

        Ok(Caller(resolve_caller_identity(claims)?))
    }
}
