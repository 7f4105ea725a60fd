use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use tracing::info;
use uuid::Uuid;

use parley_db::Database;
use parley_gateway::dispatcher::Dispatcher;
use parley_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{ApiError, blocking_err};
use crate::token;

pub type AppState = Arc<AppStateInner>;

/// Shared context passed to every handler at construction — the store
/// handle, the gateway dispatcher and the token signing secret. Nothing
/// reads process-global state after startup.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub dispatcher: Dispatcher,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("username and password are required"));
    }

    let existing = {
        let db = state.db.clone();
        let username = req.username.clone();
        tokio::task::spawn_blocking(move || db.get_user_by_username(&username))
            .await
            .map_err(blocking_err)??
    };
    if existing.is_some() {
        return Err(ApiError::Conflict);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();

    let user_id = Uuid::new_v4();
    {
        let db = state.db.clone();
        let username = req.username.clone();
        tokio::task::spawn_blocking(move || {
            db.create_user(&user_id.to_string(), &username, &password_hash)
        })
        .await
        .map_err(blocking_err)??;
    }

    info!("registered user {} ({})", req.username, user_id);
    Ok(Json(RegisterResponse {
        message: "user registered".into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = {
        let db = state.db.clone();
        let username = req.username.clone();
        tokio::task::spawn_blocking(move || db.get_user_by_username(&username))
            .await
            .map_err(blocking_err)??
    }
    .ok_or(ApiError::BadCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored hash unreadable: {e}"))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::BadCredentials)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {e}", user.id))?;

    let token = token::issue(&state.jwt_secret, user_id, &user.username)?;

    info!("user {} logged in", user.username);
    Ok(Json(LoginResponse {
        message: "login successful".into(),
        token,
    }))
}
