//! Sign-in route

use axum::{
    Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    routing::post,
};
use shop_auth::AuthError;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ApiResponse, LoginRequest, LoginResponse};
use super::validation::{validate_password_length, validate_username};

/// POST /api/auth/signin
async fn signin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    // Validate input lengths to prevent DoS
    validate_username(&request.username)?;
    validate_password_length(&request.password)?;

    debug!("Login attempt for user: {}", request.username);

    let outcome = match state.auth.login(&request.username, &request.password).await {
        Ok(outcome) => {
            metrics::counter!("shop_admin_logins_total", "outcome" => "success").increment(1);
            outcome
        }
        Err(e) => {
            metrics::counter!("shop_admin_logins_total", "outcome" => "failure").increment(1);
            if matches!(e, AuthError::InvalidCredentials) {
                warn!("Rejected login for user: {}", request.username);
            }
            return Err(e.into());
        }
    };

    let cookie = state.cookie.build(&outcome.token);
    let body = ApiResponse::new(
        "Login Successfully!!!",
        LoginResponse {
            username: outcome.user.username,
            token: outcome.token,
            expires_in: outcome.expires_in,
        },
    );

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/auth/signin", post(signin))
}
