//! Remote build API client
//!
//! Fetches build records and starts builds, retrying transient failures
//! according to a [`RetryPolicy`].

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{Build, BuildEnvelope, StartRequest, StartResponse};
use super::retry::RetryPolicy;
use crate::config::{defaults, urls};
use crate::error::ApiError;

/// Settings for an [`ApiClient`]
#[derive(Clone)]
pub struct ApiClientConfig {
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Slug of the app all builds belong to
    pub app_slug: String,
    /// Personal access token
    pub access_token: String,
    /// Retry policy for every request
    pub retry: RetryPolicy,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiClientConfig {
    /// Create a config against the public API with the default retry policy
    pub fn new(app_slug: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: urls::API_BASE.to_string(),
            app_slug: app_slug.into(),
            access_token: access_token.into(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }

    /// Use a different API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use a different per-request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("base_url", &self.base_url)
            .field("app_slug", &self.app_slug)
            .field("access_token", &"<redacted>")
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// HTTP client for the remote build API
///
/// Owns its own `reqwest::Client`, so timeouts and retry settings never leak
/// between unrelated clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    client: reqwest::Client,
    /// Client settings
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(mut config: ApiClientConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);

        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
        }
    }

    fn builds_url(&self) -> String {
        format!(
            "{}/{}/apps/{}/builds",
            self.config.base_url,
            urls::API_VERSION,
            self.config.app_slug
        )
    }

    /// Fetch a single build
    pub async fn get_build(&self, build_slug: &str) -> Result<Build, ApiError> {
        if build_slug.trim().is_empty() {
            return Err(ApiError::EmptyBuildSlug);
        }

        let url = format!("{}/{}", self.builds_url(), build_slug);
        let envelope: BuildEnvelope = self.send(Method::GET, &url, None).await?;
        Ok(envelope.data)
    }

    /// Start a new build
    ///
    /// Invalid build params are rejected before any request is made.
    pub async fn start_build(&self, request: &StartRequest) -> Result<StartResponse, ApiError> {
        let body = request.to_body()?;
        let url = self.builds_url();
        self.send(Method::POST, &url, Some(&body)).await
    }

    /// Send a request with retries and decode the response body
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let (status, text) = backoff::future::retry_notify(
            self.config.retry.backoff(),
            || {
                let method = method.clone();
                async move {
                    self.send_once(method, url, body).await.map_err(|e| {
                        if e.is_retryable() {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |e: ApiError, wait: Duration| {
                tracing::warn!(
                    %method,
                    url,
                    error = %e,
                    "Request failed, retrying in {:?}",
                    wait
                );
            },
        )
        .await?;

        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse {
            status: status.as_u16(),
            body: text.clone(),
            error: e.to_string(),
        })
    }

    /// Single attempt without retry
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, String), ApiError> {
        tracing::debug!(%method, url, "Sending request");

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", self.config.access_token));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok((status, text))
    }
}
