//! HTTP client for the gradebook REST API.
//!
//! This module provides the `ApiClient` struct, a thin JSON-over-HTTP layer
//! used as the production gateway behind every store.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::GatewayError;
use crate::config::Config;

/// API client for the gradebook service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with the given request timeout.
    ///
    /// The cookie store is enabled so that a session cookie issued by the
    /// server is sent back on every later request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, converting it into a rejection if not.
    async fn check_response(response: Response) -> Result<Response, GatewayError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status,
            body = %GatewayError::truncate_body(&body),
            "Request rejected"
        );
        Err(GatewayError::from_status(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, GatewayError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url = url, error = %e, "Failed to parse JSON response");
            GatewayError::local(format!("Invalid response from {}: {}", url, e))
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "GET");

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = Self::check_response(request.send().await?).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(url = %url, "PUT");

        let response = self.client.put(&url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn delete_resource(&self, path: &str) -> Result<(), GatewayError> {
        let url = self.url(path);
        debug!(url = %url, "DELETE");

        let response = self.client.delete(&url).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/", Duration::from_secs(5))
            .expect("client builds");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/alunos"), "http://localhost:8080/api/alunos");
    }
}
