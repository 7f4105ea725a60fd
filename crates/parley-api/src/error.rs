use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the HTTP API. Every handler returns
/// `Result<_, ApiError>`; the response mapping lives in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("username already exists")]
    Conflict,

    #[error("invalid username or password")]
    BadCredentials,

    #[error("missing or invalid token")]
    Unauthorized,

    /// Store failures and anything else unexpected. The detail is logged
    /// server-side; the client only ever sees a generic message.
    #[error("internal error")]
    Persistence(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::BadCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Persistence(err) = &self {
            error!("request failed: {:#}", err);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Blocking store work runs on the blocking pool; a join failure is an
/// internal error like any other store failure.
pub(crate) fn blocking_err(err: tokio::task::JoinError) -> ApiError {
    ApiError::Persistence(anyhow::anyhow!("blocking task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("room is required").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::BadCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Persistence(anyhow::anyhow!("disk on fire")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_detail_is_not_leaked() {
        let err = ApiError::Persistence(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "internal error");
    }
}
