/// Request extractors that reject with [`ApiError`]
///
/// Axum's own `Json`, `Path` and `Query` extractors answer malformed input
/// with plain-text 400/415/422 responses. These wrappers run the same
/// extractors but turn the rejection into the API's JSON error body with a
/// 400 status.
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::extract::{ApiJson, ApiPath};
/// use uuid::Uuid;
///
/// #[derive(serde::Deserialize)]
/// struct Rename { title: String }
///
/// async fn rename(ApiPath(id): ApiPath<Uuid>, ApiJson(body): ApiJson<Rename>) -> String {
///     format!("{id} -> {}", body.title)
/// }
/// ```

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
