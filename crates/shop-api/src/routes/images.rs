//! Public image download routes

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use shop_storage::validate_object_name;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// How the browser should present the file
#[derive(Clone, Copy)]
enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    fn header_value(self, filename: &str) -> String {
        let kind = match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        };
        format!("{}; filename=\"{}\"", kind, filename.replace('"', ""))
    }
}

async fn serve(state: &AppState, filename: &str, disposition: Disposition) -> Result<Response, ApiError> {
    validate_object_name(filename)?;
    debug!("Serving image: {}", filename);

    let data = state.storage.get(filename).await?;
    let mime = mime_guess::from_path(filename).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition.header_value(filename)),
        ],
        data,
    )
        .into_response())
}

/// GET /api/product/image/{filename}
async fn view_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve(&state, &filename, Disposition::Inline).await
}

/// GET /api/product/download/{filename}
async fn download_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve(&state, &filename, Disposition::Attachment).await
}

/// Create image routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/product/image/{filename}", get(view_image))
        .route("/api/product/download/{filename}", get(download_image))
}
