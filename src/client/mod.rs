//! Status client for the API health endpoint.
//!
//! [`StatusClient`] performs the single `GET /api/health` request;
//! [`StatusPanel`] turns its outcome into one of the displayable
//! [`StatusView`] states.

mod panel;

pub use panel::{StatusPanel, StatusView, FAILURE_MESSAGE, LOADING_MESSAGE};

use std::time::Duration;

use tracing::instrument;

use crate::config::ClientConfig;
use crate::model::HealthStatus;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or a body that is not a health status
    #[error("Health request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// HTTP client bound to one API base URL. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    api_url: String,
}

impl StatusClient {
    /// Client with reqwest's default timeouts.
    pub fn new(api_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::build(api_url.into(), None)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::build(
            config.api_url.clone(),
            config.timeout_seconds.map(Duration::from_secs),
        )
    }

    fn build(api_url: String, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.api_url)
    }

    /// Fetch and decode the health status once. No retry.
    ///
    /// The HTTP status code is not inspected: any body that decodes as a
    /// [`HealthStatus`] is a success.
    #[instrument(name = "client::fetch_health", skip(self), fields(url = %self.health_url()))]
    pub async fn fetch_health(&self) -> Result<HealthStatus, ClientError> {
        let health = self
            .http
            .get(self.health_url())
            .send()
            .await?
            .json::<HealthStatus>()
            .await?;
        tracing::debug!(database = %health.database, "Health status received");
        Ok(health)
    }
}
