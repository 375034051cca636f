//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use shop_db::{User, UserWithRole};

/// Envelope every successful response is wrapped in
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_in: i64,
}

// ==================== User Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub role_id: String,
}

/// Partial user update; absent fields are left unchanged
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<String>,
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role_id: user.role_id,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// User together with its role name
#[derive(Serialize)]
pub struct UserRoleResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role_id: String,
    pub role_name: String,
}

impl From<UserWithRole> for UserRoleResponse {
    fn from(row: UserWithRole) -> Self {
        Self {
            id: row.user_id,
            username: row.username,
            name: row.name,
            role_id: row.role_id,
            role_name: row.role_name.as_str().to_string(),
        }
    }
}

// ==================== Role Types ====================

/// Create role request
#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}
