//! Shared HTTP client carrying the project key and the session token.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use tokio::sync::RwLock;

use crate::config::RemoteConfig;
use crate::error::{extract_message, RemoteError};

/// Cheaply cloneable handle shared by every adapter.
///
/// Requests carry the anonymous key as `apikey` and, when signed in, the
/// access token as the bearer; otherwise the anonymous key is the bearer
/// and the backend applies its public access policy.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: Arc<RemoteConfig>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(http: reqwest::Client, config: RemoteConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    /// Build a request with the key and bearer headers applied.
    pub async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token()
            .await
            .unwrap_or_else(|| self.config.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    // ---- response helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RemoteError::Api`] carrying
    /// the status and extracted message on failure.
    pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    pub async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    pub async fn check_status(response: reqwest::Response) -> Result<(), RemoteError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
