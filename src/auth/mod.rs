use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Bearer token claims. `sub` carries the caller's unique identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn for_owner(owner_id: Uuid, expiry_hours: u64) -> Self {
        Self::new(Some(owner_id.to_string()), expiry_hours)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Why a caller identity could not be derived from validated claims
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Token does not carry a user identifier claim")]
    MissingClaim,
    #[error("User identifier claim '{0}' is not a valid UUID")]
    MalformedIdentifier(String),
}

/// The single place a request's owner identity is derived
pub fn resolve_caller_identity(claims: &Claims) -> Result<Uuid, IdentityError> {
    let sub = claims
        .sub
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(IdentityError::MissingClaim)?;

    Uuid::parse_str(sub).map_err(|_| IdentityError::MalformedIdentifier(sub.to_string()))
}

/// Sign claims with HS256. Used by local tooling and tests to mint bearer tokens.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Bearer token for `owner_id` signed with the configured secret and lifetime
pub fn mint_owner_token(owner_id: Uuid, security: &SecurityConfig) -> Result<String, JwtError> {
    generate_jwt(&Claims::for_owner(owner_id, security.jwt_expiry_hours), &security.jwt_secret)
}

/// Verify signature and expiry, returning the claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn resolves_uuid_subject() {
        let owner = Uuid::new_v4();
        assert_eq!(resolve_caller_identity(&Claims::for_owner(owner, 1)), Ok(owner));
    }

    #[test]
    fn missing_or_blank_subject_is_rejected() {
        assert_eq!(resolve_caller_identity(&Claims::new(None, 1)), Err(IdentityError::MissingClaim));
        assert_eq!(
            resolve_caller_identity(&Claims::new(Some("  ".into()), 1)),
            Err(IdentityError::MissingClaim)
        );
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        assert_eq!(
            resolve_caller_identity(&Claims::new(Some("validUserId".into()), 1)),
            Err(IdentityError::MalformedIdentifier("validUserId".into()))
        );
    }

    #[test]
    fn tokens_round_trip_with_matching_secret_only() {
        let owner = Uuid::new_v4();
        let token = generate_jwt(&Claims::for_owner(owner, 1), SECRET).unwrap();

        let claims = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, Some(owner.to_string()));
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut claims = Claims::for_owner(Uuid::new_v4(), 1);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(validate_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn minted_tokens_use_configured_lifetime() {
        let security = SecurityConfig {
            enable_cors: false,
            cors_origins: Vec::new(),
            jwt_secret: SECRET.to_string(),
            jwt_expiry_hours: 4,
        };
        let owner = Uuid::new_v4();

        let token = mint_owner_token(owner, &security).unwrap();

        let claims = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(resolve_caller_identity(&claims), Ok(owner));
        assert_eq!(claims.exp - claims.iat, 4 * 3600);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            generate_jwt(&Claims::new(None, 1), ""),
            Err(JwtError::InvalidSecret)
        ));
    }
}
