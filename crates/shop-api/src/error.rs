//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] shop_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] shop_auth::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] shop_storage::StorageError),
}

const INTERNAL_MESSAGE: &str = "Internal server error";

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    let body = axum::Json(json!({
        "error": {
            "code": code,
            "message": message,
        }
    }));
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Database(e) => match e {
                shop_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                shop_db::DbError::Duplicate(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
                e => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },
            ApiError::Storage(e) => match e {
                shop_storage::StorageError::NotFound(name) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("File not found: {}", name),
                ),
                shop_storage::StorageError::InvalidName(name) => (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    format!("Invalid file name: {}", name),
                ),
                e => {
                    error!("Storage error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },
        };

        error_body(status, code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_database_errors_are_classified() {
        let response = ApiError::from(shop_db::DbError::Duplicate("User 'a' already exists".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::from(shop_db::DbError::Connection(sqlx::Error::PoolClosed))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_storage_errors_are_classified() {
        let response =
            ApiError::from(shop_storage::StorageError::InvalidName("../x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::from(shop_storage::StorageError::S3("bucket gone at 10.0.0.5".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(!body.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_auth_errors_keep_their_shape() {
        let response = ApiError::from(shop_auth::AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "login or password is incorrect");
    }
}
