//! REST API client for the AutoML core HTTP endpoints.
//!
//! Wraps job forwarding (`POST /process`) using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;

use crate::messages::ProcessJobRequest;

/// Default timeout for a single forwarding request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the AutoML core REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum AutoMlApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The AutoML core answered with a status other than 200/202.
    #[error("unexpected status code {status}: {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Something that can hand a job to the external worker.
///
/// The dispatcher depends on this seam rather than on [`AutoMlApi`]
/// directly so tests can substitute an in-process worker.
#[async_trait]
pub trait JobForwarder: Send + Sync {
    async fn forward(&self, request: &ProcessJobRequest) -> Result<(), AutoMlApiError>;
}

/// HTTP client for a single AutoML core instance.
pub struct AutoMlApi {
    client: reqwest::Client,
    api_url: String,
}

impl AutoMlApi {
    /// Create a client with the given per-request timeout.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:8000`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, AutoMlApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Forward a job for processing.
    ///
    /// Sends `POST /process`. The worker acknowledges with 200 or 202 and
    /// reports progress later through the gateway's callbacks.
    pub async fn process_job(&self, request: &ProcessJobRequest) -> Result<(), AutoMlApiError> {
        let response = self
            .client
            .post(format!("{}/process", self.api_url))
            .json(request)
            .send()
            .await?;

        Self::ensure_accepted(response).await
    }

    // ---- private helpers ----

    async fn ensure_accepted(response: reqwest::Response) -> Result<(), AutoMlApiError> {
        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::ACCEPTED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AutoMlApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl JobForwarder for AutoMlApi {
    async fn forward(&self, request: &ProcessJobRequest) -> Result<(), AutoMlApiError> {
        tracing::debug!(
            job_id = %request.job_id,
            api_url = %self.api_url,
            "Forwarding job to AutoML core",
        );
        self.process_job(request).await
    }
}
