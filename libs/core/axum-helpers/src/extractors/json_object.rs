//! Lenient JSON object body extractor.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

/// Request body as a raw JSON object.
///
/// Field rules run against the raw values, so the body is not bound to a
/// struct here. An empty body yields an empty object. The content type is
/// not checked.
#[derive(Debug, Clone, Default)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonObject(Map::new()));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(JsonObject(map)),
            Ok(_) => Err(AppError::InvalidJson(
                "Request body must be a JSON object".to_string(),
            )),
            Err(e) => Err(AppError::InvalidJson(format!("Malformed JSON: {e}"))),
        }
    }
}
