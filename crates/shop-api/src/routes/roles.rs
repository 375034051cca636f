//! Role routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use shop_auth::{AuthGate, require_role};
use shop_db::{Role, UserRole};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ApiResponse, CreateRoleRequest};

/// POST /api/roles/create (Admin only)
///
/// The role set is closed and both roles are seeded at startup, so on a
/// running server this answers 409 for `admin`/`customer` and 400 for any
/// other name. It stays for clients that call it during setup.
async fn create_role(
    State(state): State<AppState>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Role>>), ApiError> {
    let name: UserRole = request
        .name
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", request.name)))?;

    let role = state.db.insert_role(name).await?;
    info!("Created role: {}", role.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Role created", role)),
    ))
}

/// GET /api/roles/allRoles
async fn list_roles(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Role>>>, ApiError> {
    let roles = state.db.list_roles().await?;
    Ok(Json(ApiResponse::new("Roles found", roles)))
}

/// Create role routes
pub fn routes(admin: AuthGate) -> Router<AppState> {
    let gated = Router::new()
        .route("/api/roles/create", post(create_role))
        .route_layer(from_fn_with_state(admin, require_role));

    Router::new()
        .route("/api/roles/allRoles", get(list_roles))
        .merge(gated)
}
