use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde_json::Value;

use crate::error::ApiError;
use crate::model::Record;

/// POST/PUT body merged verbatim into a record.
///
/// A missing body, an empty one, or one not declared as JSON reads as `{}`.
/// Only a JSON body that fails to parse or is not an object is rejected.
#[derive(Debug, Default, PartialEq)]
pub struct Payload(pub Record);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Ok(Payload::default());
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::MalformedPayload)?;

        Payload::from_bytes(&bytes)
    }
}

impl Payload {
    fn from_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::default());
        }

        match serde_json::from_slice(bytes) {
            Ok(Value::Object(record)) => Ok(Payload(record)),
            _ => Err(ApiError::MalformedPayload),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
