use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::model::Kind;

/// Errors raised by the in-memory store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(Kind),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Errors surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Endpoint not found")]
    EndpointNotFound,

    #[error("Malformed payload")]
    MalformedPayload,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Store(StoreError::NotFound(_)) | ApiError::EndpointNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::MalformedPayload => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::LockPoisoned) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::from(StoreError::NotFound(Kind::Workout));
        assert_eq!(err.to_string(), "Workout not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_malformed_payload_is_bad_request() {
        let response = ApiError::MalformedPayload.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_lock_poisoned_is_server_error() {
        let err = ApiError::from(StoreError::LockPoisoned);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_misses_are_logged_as_warnings() {
        let output = logged(|| {
            ApiError::from(StoreError::NotFound(Kind::Goal)).into_response();
            ApiError::EndpointNotFound.into_response();
        });
        assert!(output.contains("WARN"));
        assert!(output.contains("Goal not found"));
        assert!(output.contains("Endpoint not found"));
    }

    #[test]
    fn test_lock_poisoned_is_logged_as_error() {
        let output = logged(|| {
            ApiError::from(StoreError::LockPoisoned).into_response();
        });
        assert!(output.contains("ERROR"));
        assert!(output.contains("Lock poisoned"));
    }
}
