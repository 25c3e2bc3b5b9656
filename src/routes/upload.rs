use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};

use crate::error::ApiError;
use crate::middleware::tenant::Tenant;
use crate::models::api::ApiResponse;
use crate::services::image_service::{ImageData, ImageService, ImageUploadError};
use crate::AppState;

fn image_service(state: &AppState) -> Result<&ImageService, ApiError> {
    state
        .images
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Image uploads are not configured".to_string()))
}

/// Multipart form with a `file` part and an optional `folder` text part.
pub async fn upload_multipart(
    state: web::Data<AppState>,
    tenant: Tenant,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let images = image_service(&state)?;
    let limit = state.config.max_upload_bytes;

    let mut file: Option<(Vec<u8>, String)> = None;
    let mut folder: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            if bytes.len() + chunk.len() > limit {
                return Err(ImageUploadError::TooLarge {
                    size: bytes.len() + chunk.len(),
                    limit,
                }
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => {
                let content_type = content_type.ok_or_else(|| {
                    ImageUploadError::InvalidImageFormat("Missing content type".to_string())
                })?;
                file = Some((bytes, content_type));
            }
            "folder" => {
                folder = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            _ => {}
        }
    }

    let (bytes, content_type) =
        file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    let uploaded = images
        .upload_bytes(tenant.as_str(), bytes, &content_type, folder.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(uploaded)))
}

/// JSON body read by hand so the limit follows the configured image size
/// rather than the default JSON limit.
pub async fn upload_base64(
    state: web::Data<AppState>,
    tenant: Tenant,
    mut payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let images = image_service(&state)?;
    let limit = images.max_request_bytes();

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge(format!(
                "Request body exceeds {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }

    let image: ImageData = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    let uploaded = images.upload_base64(tenant.as_str(), image).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(uploaded)))
}
