//! Multipart form parsing and image upload

use axum::extract::Multipart;
use bytes::Bytes;
use shop_storage::object_name_for_upload;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Form field carrying the uploaded image
const IMAGE_FIELD: &str = "image";

/// File part of a multipart form
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// Text fields plus the optional image of a multipart form
#[derive(Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub image: Option<UploadedFile>,
}

impl UploadForm {
    /// Drain a multipart body
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?;
                // Browsers send an empty part when no file was chosen
                if !data.is_empty() {
                    form.image = Some(UploadedFile { file_name, data });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Take a text field out of the form
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Take the image, failing when it is missing
    pub fn take_image(&mut self) -> Result<UploadedFile, ApiError> {
        self.image
            .take()
            .ok_or_else(|| ApiError::BadRequest(format!("Field '{}' is required", IMAGE_FIELD)))
    }
}

/// Store an uploaded image and return its object name
pub async fn store_image(state: &AppState, file: UploadedFile) -> Result<String, ApiError> {
    let object_name = object_name_for_upload(&file.file_name);
    debug!(
        "Uploading image {} as {} ({} bytes)",
        file.file_name,
        object_name,
        file.data.len()
    );

    state.storage.put(&object_name, file.data).await?;
    Ok(object_name)
}

/// Remove an image that no record points at any more
///
/// Failures are only logged; the request outcome is already decided.
pub async fn discard_image(state: &AppState, object_name: &str) {
    match state.storage.delete(object_name).await {
        Ok(true) => debug!("Removed image {}", object_name),
        Ok(false) => debug!("Image {} was already gone", object_name),
        Err(e) => warn!("Failed to remove image {}: {}", object_name, e),
    }
}
