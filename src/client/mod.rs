//! HTTP client for the FitnessBuddy API.
//!
//! [`ApiClient`] issues JSON requests against a base URL and turns any non-success
//! status into a [`ClientError`] carrying the server's `message` when it sent one.
//! The per-resource accessors ([`ApiClient::profiles`], [`ApiClient::buddies`], ...)
//! only bind paths and parameters onto the generic calls.

mod resources;

pub use resources::ResourceApi;

use reqwest::{Method, StatusCode, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "FITBUDDY_API_BASE_URL";

/// Base URL used when [`BASE_URL_ENV`] is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Errors returned by [`ApiClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// The server could not be reached or the transfer failed
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// A success body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status for errors the server answered with
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network(e) => e.status(),
            ClientError::Decode(_) => None,
        }
    }
}

/// Client for the FitnessBuddy REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from [`BASE_URL_ENV`], defaulting to the local server
    pub fn from_env() -> Self {
        Self::new(std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request to `endpoint` and decode the JSON response
    pub async fn call<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let result = self.send(method, endpoint, body).await;
        if let Err(e) = &result {
            error!("API call error ({}): {}", endpoint, e);
        }
        result
    }

    async fn send<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: error_message(status, &bytes),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.call::<T, Value>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.call::<T, Value>(Method::DELETE, endpoint, None).await
    }

    /// Server health payload
    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get("/health").await
    }
}

/// Message for a failed response: the body's `message`, else the status phrase
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let fallback = || format!("API Error: {}", status.as_u16());

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Err(_) => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(fallback),
    }
}
