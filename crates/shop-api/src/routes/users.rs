//! User management routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use shop_auth::{AuthGate, Registration, authorize, require_role};
use shop_db::{UpdateUser, UserRole};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    ApiResponse, CreateUserRequest, UpdateUserRequest, UserResponse, UserRoleResponse,
};
use super::validation::{validate_password, validate_username};

/// POST /api/users/create
///
/// Open for customer accounts; an admin account needs an admin token.
async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    let requested = state.db.get_role_by_id(&request.role_id).await?;
    if requested.is_some_and(|role| role.name == UserRole::Admin) {
        let creator = authorize(&headers, &state.jwt, UserRole::Admin)?;
        debug!("Admin {} is creating admin user {}", creator.id, request.username);
    }

    debug!("Creating user: {}", request.username);

    let user = state
        .auth
        .register(Registration {
            username: request.username,
            password: request.password,
            name: request.name,
            role_id: request.role_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User created", user.into())),
    ))
}

/// GET /api/users (Admin only)
async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.db.list_users().await?;

    Ok(Json(ApiResponse::new(
        "Users found",
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/users/{id} (Admin only)
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(ApiResponse::new("User found", user.into())))
}

/// GET /api/users/{id}/role (Admin only)
async fn get_user_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserRoleResponse>>, ApiError> {
    let row = state
        .db
        .get_user_with_role(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with role: {}", id)))?;

    Ok(Json(ApiResponse::new("User found", row.into())))
}

/// PUT /api/users/update/{id} (Admin only)
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    debug!("Updating user: {}", id);

    if let Some(role_id) = &request.role_id {
        state
            .db
            .get_role_by_id(role_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Role: {}", role_id)))?;
    }

    let password_hash = match &request.password {
        Some(password) => {
            validate_password(password)?;
            Some(state.auth.hasher().hash(password)?)
        }
        None => None,
    };

    let user = state
        .db
        .update_user(
            &id,
            UpdateUser {
                name: request.name,
                password_hash,
                role_id: request.role_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated user: {}", user.username);

    Ok(Json(ApiResponse::new("User updated", user.into())))
}

/// DELETE /api/users/delete/{id} (Admin only)
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    debug!("Deleting user: {}", id);

    if !state.db.delete_user(&id).await? {
        return Err(ApiError::NotFound(format!("User: {}", id)));
    }

    info!("Deleted user: {}", id);
    Ok(Json(ApiResponse::new("User deleted", id)))
}

/// Create user routes
pub fn routes(admin: AuthGate) -> Router<AppState> {
    let gated = Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/role", get(get_user_role))
        .route("/api/users/update/{id}", put(update_user))
        .route("/api/users/delete/{id}", delete(delete_user))
        .route_layer(from_fn_with_state(admin, require_role));

    Router::new()
        .route("/api/users/create", post(create_user))
        .merge(gated)
}
