//! Product routes

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use shop_auth::{AuthGate, require_role};
use shop_db::{NewProduct, Product, UpdateProduct};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::ApiResponse;
use super::upload::{UploadForm, discard_image, store_image};
use super::validation::require_field;

/// POST /api/product/createProduct
async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let name = require_field(form.take("name"), "name")?;
    let price = require_field(form.take("price"), "price")?;
    let image = form.take_image()?;

    let image = store_image(&state, image).await?;
    let inserted = state
        .db
        .insert_product(NewProduct {
            name,
            image: image.clone(),
            price,
            description: form.take("desc").unwrap_or_default(),
            stock: form.take("stock").unwrap_or_default(),
            weight: form.take("weight").unwrap_or_default(),
        })
        .await;
    let product = match inserted {
        Ok(product) => product,
        Err(e) => {
            discard_image(&state, &image).await;
            return Err(e.into());
        }
    };
    info!("Created product: {} ({})", product.name, product.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Product Created", product)),
    ))
}

/// GET /api/product/allProduct
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.db.list_products().await?;
    Ok(Json(ApiResponse::new("Products found", products)))
}

/// GET /api/product/oneProduct/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .db
        .get_product(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product: {}", id)))?;

    Ok(Json(ApiResponse::new("Product found", product)))
}

/// PUT /api/product/updateProduct/{id}
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest("Invalid product ID".to_string()))?;

    let mut form = UploadForm::read(multipart).await?;
    let name = require_field(form.take("name"), "name")?;
    let price = require_field(form.take("price"), "price")?;
    let stock = require_field(form.take("stock"), "stock")?;
    let weight = require_field(form.take("weight"), "weight")?;
    let description = form.take("desc");

    let existing = state
        .db
        .get_product(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product: {}", id)))?;

    let image = match form.image.take() {
        Some(file) => Some(store_image(&state, file).await?),
        None => None,
    };

    debug!("Updating product: {}", id);
    let updated = state
        .db
        .update_product(
            &id,
            UpdateProduct {
                name,
                image: image.clone(),
                price,
                description,
                stock,
                weight,
            },
        )
        .await;

    let product = match updated {
        Ok(Some(product)) => product,
        failed => {
            if let Some(image) = &image {
                discard_image(&state, image).await;
            }
            return Err(match failed {
                Err(e) => e.into(),
                Ok(_) => ApiError::NotFound(format!("Product: {}", id)),
            });
        }
    };

    if image.is_some() && existing.image != product.image {
        discard_image(&state, &existing.image).await;
    }
    info!("Updated product: {}", product.id);

    Ok(Json(ApiResponse::new("Product Updated", product)))
}

/// DELETE /api/product/deleteProduct/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let product = state
        .db
        .get_product(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product: {}", id)))?;

    if !state.db.delete_product(&id).await? {
        return Err(ApiError::NotFound(format!("Product: {}", id)));
    }

    discard_image(&state, &product.image).await;

    info!("Deleted product: {}", id);
    Ok(Json(ApiResponse::new("Product Deleted", id)))
}

/// Create product routes (Admin only)
pub fn routes(admin: AuthGate) -> Router<AppState> {
    Router::new()
        .route("/api/product/createProduct", post(create_product))
        .route("/api/product/allProduct", get(list_products))
        .route("/api/product/oneProduct/{id}", get(get_product))
        .route("/api/product/updateProduct/{id}", put(update_product))
        .route("/api/product/deleteProduct/{id}", delete(delete_product))
        .route_layer(from_fn_with_state(admin, require_role))
}
