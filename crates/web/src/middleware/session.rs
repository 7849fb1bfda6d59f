//! Caller identity for user-facing endpoints.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use storage::services::session::{AuthenticatedUser, IdentityProvider, SessionError};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

/// Claims issued by the GreenCity auth service. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Validates HS256 bearer tokens signed with a shared secret
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.trim_matches('"').as_bytes()),
            validation,
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn authenticate(&self, bearer_token: Option<&str>) -> Result<AuthenticatedUser, SessionError> {
        let token = bearer_token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingCredentials)?;

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            SessionError::InvalidCredentials(e.to_string())
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            SessionError::InvalidCredentials("subject is not a user id".to_string())
        })?;

        Ok(AuthenticatedUser::new(user_id))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// A header with another scheme counts as invalid, not missing.
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>, SessionError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(|| {
            SessionError::InvalidCredentials(
                "expected 'Bearer <token>' authorization header".to_string(),
            )
        })
}

/// The caller, if any. Requests with bad credentials are rejected outright;
/// requests with none get `CurrentUser(None)`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(Self(state.identity.current_user(token)?))
    }
}

/// An authenticated caller; the request fails with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub AuthenticatedUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(Self(state.identity.authenticate(token)?))
    }
}
