//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// Single UUID path segment.
///
/// A segment that is not a UUID cannot name any record, so it is rejected
/// as `404 Not Found` rather than `400`.
///
/// ```ignore
/// async fn show(UuidPath(id): UuidPath) -> String {
///     id.to_string()
/// }
///
/// Router::new().route("/users/{id}", get(show));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Resource not found".to_string()))?;

        Uuid::parse_str(&raw)
            .map(UuidPath)
            .map_err(|_| AppError::NotFound("Resource not found".to_string()))
    }
}
