//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are never distinguished
    #[error("login or password is incorrect")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token claims")]
    MalformedClaims,

    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// A stored user references a role that does not exist
    #[error("Role not found for user {0}")]
    RoleNotFound(String),

    /// Registration named a role that does not exist
    #[error("Role not found: {0}")]
    UnknownRole(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Signing secret is not configured")]
    MissingSigningKey,

    #[error("Token lifetime out of range: {0} hours")]
    InvalidTokenLifetime(i64),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] shop_db::DbError),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MalformedClaims
            | AuthError::MissingCredentials
            | AuthError::InvalidAuthHeader
            | AuthError::InsufficientPermissions => StatusCode::UNAUTHORIZED,
            AuthError::UnknownRole(_) => StatusCode::NOT_FOUND,
            AuthError::UsernameTaken(_) => StatusCode::CONFLICT,
            AuthError::RoleNotFound(_)
            | AuthError::MissingSigningKey
            | AuthError::InvalidTokenLifetime(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for the response body
    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients
    ///
    /// Server-side failures collapse to a generic message; details only go to the log.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::UnknownRole(_) => "Role not found".to_string(),
            AuthError::UsernameTaken(_) => "Username already exists".to_string(),
            e if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                "Internal server error".to_string()
            }
            e => e.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication failure: {}", self);
        }

        let body = axum::Json(json!({
            "error": {
                "code": self.code(),
                "message": self.client_message(),
            }
        }));

        (status, body).into_response()
    }
}
