//! Category routes

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use shop_auth::{AuthGate, require_role};
use shop_db::{Category, NewCategory};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::ApiResponse;
use super::upload::{UploadForm, discard_image, store_image};
use super::validation::require_field;

/// POST /api/categori/createCategori
async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let name = require_field(form.take("name"), "name")?;
    let image = form.take_image()?;

    let image = store_image(&state, image).await?;
    let category = match state
        .db
        .insert_category(NewCategory {
            name,
            image: image.clone(),
        })
        .await
    {
        Ok(category) => category,
        Err(e) => {
            discard_image(&state, &image).await;
            return Err(e.into());
        }
    };
    info!("Created category: {} ({})", category.name, category.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Categories Created", category)),
    ))
}

/// GET /api/categori/allCategori
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = state.db.list_categories().await?;
    Ok(Json(ApiResponse::new("Categories found", categories)))
}

/// GET /api/categori/oneCategori/{id}
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let category = state
        .db
        .get_category(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Category: {}", id)))?;

    Ok(Json(ApiResponse::new("Category found", category)))
}

/// Create category routes (Admin only)
pub fn routes(admin: AuthGate) -> Router<AppState> {
    Router::new()
        .route("/api/categori/createCategori", post(create_category))
        .route("/api/categori/allCategori", get(list_categories))
        .route("/api/categori/oneCategori/{id}", get(get_category))
        .route_layer(from_fn_with_state(admin, require_role))
}
