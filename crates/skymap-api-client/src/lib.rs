//! HTTP client for the SkyMap API.
//!
//! Thin wrapper over `reqwest` with GET and multipart helpers plus the domain methods in
//! [`api`]. The CLI uses this client directly.

pub mod api;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub use api::content_type_for;
pub use skymap_core::models::{GeoCoordinate, MapView, SkyImage};

pub const API_PREFIX: &str = "/api/v0";

/// Header carrying the upload session key.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Non-success response from the API.
///
/// `code` is the machine-readable code from the error body when the server sent one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("API request failed with status {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn is_no_location(&self) -> bool {
        self.code.as_deref() == Some("NO_LOCATION_DATA")
    }

    pub fn is_duplicate(&self) -> bool {
        self.code.as_deref() == Some("DUPLICATE_UPLOAD")
    }

    fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Body {
            error: String,
            code: Option<String>,
        }

        match serde_json::from_str::<Body>(body) {
            Ok(parsed) => ApiError {
                status,
                code: parsed.code,
                message: parsed.error,
            },
            Err(_) => ApiError {
                status,
                code: None,
                message: if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.to_string()
                },
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: SKYMAP_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SKYMAP_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:4000".to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status.as_u16(), &body).into());
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// POST multipart form and deserialize response. `session` is sent as `X-Session-Id`.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        session: Option<&str>,
    ) -> Result<T> {
        let mut request = self.client.post(self.build_url(path)).multipart(form);
        if let Some(session) = session {
            request = request.header(SESSION_HEADER, session);
        }

        let response = request.send().await.context("Failed to send request")?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:4000/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4000");
        assert_eq!(
            client.build_url("/api/v0/images"),
            "http://localhost:4000/api/v0/images"
        );
    }

    #[test]
    fn test_api_error_from_json_body() {
        let err = ApiError::from_body(
            422,
            r#"{"error":"This image does not contain location data.","code":"NO_LOCATION_DATA","recoverable":false}"#,
        );
        assert_eq!(err.status, 422);
        assert!(err.is_no_location());
        assert!(!err.is_duplicate());
        assert_eq!(err.message, "This image does not contain location data.");
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let err = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(err.code, None);
        assert_eq!(err.message, "Bad Gateway");

        let err = ApiError::from_body(500, "");
        assert_eq!(err.message, "Unknown error");
    }
}
