//! API routes

mod auth;
mod categories;
mod health;
mod images;
pub mod metrics;
mod products;
mod roles;
pub mod types;
mod upload;
mod users;
mod validation;

use axum::{Router, extract::DefaultBodyLimit};
use shop_auth::AuthGate;
use shop_db::UserRole;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Largest accepted request body; bounds image uploads
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let admin = AuthGate::new(state.jwt.clone(), UserRole::Admin);

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Sign-in and registration
        .merge(auth::routes())
        .merge(users::routes(admin.clone()))
        .merge(roles::routes(admin.clone()))
        // Catalogue
        .merge(categories::routes(admin.clone()))
        .merge(products::routes(admin))
        .merge(images::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
