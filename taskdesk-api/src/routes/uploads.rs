/// Profile image upload
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/upload-image
/// Content-Type: multipart/form-data; boundary=...
///
/// image=<file>
/// ```
///
/// # Response
///
/// ```json
/// { "imageUrl": "http://localhost:5000/uploads/1700000000000-avatar.png" }
/// ```
///
/// Files are written to the configured upload directory and served back
/// under `/uploads`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Accepted image content types
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::BadRequest(
                "Only .jpeg, .jpg, .png and .gif formats are allowed".to_string(),
            ));
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;

        let file_name = stored_file_name(chrono::Utc::now().timestamp_millis(), &original);
        let path = state.config.uploads.dir.join(&file_name);
        tokio::fs::write(&path, &data).await?;

        tracing::info!(
            file = %file_name,
            bytes = data.len(),
            content_type = %content_type,
            "Image uploaded"
        );

        let base = public_base_url(state.config.api.public_url.as_deref(), &headers);
        return Ok(Json(UploadResponse {
            image_url: format!("{base}/uploads/{file_name}"),
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// `<millis>-<name>` with path separators and unusual characters replaced
pub fn stored_file_name(millis: i64, original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    clean = clean.trim_start_matches('.').to_string();
    if clean.is_empty() {
        clean = "upload".to_string();
    }

    format!("{millis}-{clean}")
}

/// Scheme and host used to build links back to this server
///
/// `PUBLIC_URL` wins; otherwise the request's `Host` header with the
/// scheme from `X-Forwarded-Proto` (default `http`).
pub fn public_base_url(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}
