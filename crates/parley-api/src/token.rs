use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use parley_types::api::Claims;

use crate::error::ApiError;

/// Issued tokens expire 24 hours after login.
const TOKEN_TTL_HOURS: i64 = 24;

pub fn issue(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a signed token and yield its claims. Any failure — malformed,
/// wrong secret, expired — collapses to `Unauthorized`.
pub fn verify(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    Ok(data.claims)
}

/// Explicit capability check composed into each protected handler: pull the
/// bearer token out of the Authorization header and verify it before any
/// store access happens.
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    verify(secret, token)
}
