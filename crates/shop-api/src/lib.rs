//! Shop Admin REST API
//!
//! Axum routes for sign-in, user and role management, and the
//! category/product catalogue with image upload and download.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
