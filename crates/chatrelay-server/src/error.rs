use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatrelay::errors::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

// Convert a configuration field path to its environment variable name
pub fn to_env_var(field_path: &str) -> String {
    format!("CHATRELAY_{}", field_path.to_uppercase().replace('.', "__"))
}

/// Errors a route returns before any streaming starts
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Chat {0} not found")]
    ChatForbidden(String),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    error: String,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateMessage { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Unhandled(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            ApiError::ChatForbidden(id) => (
                StatusCode::FORBIDDEN,
                "forbidden:chat",
                format!("Chat {} not found", id),
            ),
            ApiError::Unhandled(err) => {
                tracing::error!("Unhandled error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "offline:chat",
                    "Something went wrong. Please try again later.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { code, error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("store.dir"), "CHATRELAY_STORE__DIR");
        assert_eq!(to_env_var("port"), "CHATRELAY_PORT");
    }

    #[test]
    fn test_status_codes() {
        let bad = ApiError::BadRequest("nope".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let forbidden = ApiError::ChatForbidden("c1".into()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let unhandled = ApiError::from(StoreError::ChatNotFound("c1".into())).into_response();
        assert_eq!(unhandled.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_message_is_bad_request() {
        let err = ApiError::from(StoreError::DuplicateMessage {
            chat_id: "c1".into(),
            message_id: "m1".into(),
        });
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
