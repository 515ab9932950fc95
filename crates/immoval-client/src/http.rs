//! HTTP client for the valuation prediction API.

use std::error::Error as StdError;
use std::time::Duration;

use immoval_core::{ApiOutcome, NormalizedPropertyRequest};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::response::{ServerStatus, classify};

pub const DEFAULT_PREDICT_PATH: &str = "/predict";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server {
        status: u16,
        body: String,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Where and how to reach the prediction API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub predict_path: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            predict_path: DEFAULT_PREDICT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_predict_path(mut self, path: impl Into<String>) -> Self {
        self.predict_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct PredictionPayload<'a> {
    data: &'a NormalizedPropertyRequest,
}

/// Client for the status probe and prediction endpoints.
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
    predict_url: String,
}

impl PredictionClient {
    /// Build a client from `config`.
    ///
    /// The base URL loses any trailing slash; the predict path gains a leading
    /// one if it lacks it. Every request is bounded by `config.timeout`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Config("API base URL is empty".into()));
        }
        let path = config.predict_path.trim();
        let predict_url = if path.starts_with('/') {
            format!("{base_url}{path}")
        } else {
            format!("{base_url}/{path}")
        };

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            predict_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Probe the API root and return its status message.
    pub async fn status(&self) -> Result<ServerStatus, ClientError> {
        info!(url = %self.base_url, "probing prediction service");
        let resp = self.client.get(&self.base_url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Send one prediction request. Never retries; never fails.
    ///
    /// Anything that prevents a response from arriving becomes
    /// [`ApiOutcome::TransportError`].
    pub async fn submit(&self, request: &NormalizedPropertyRequest) -> ApiOutcome {
        info!(url = %self.predict_url, "submitting valuation request");
        let payload = PredictionPayload { data: request };

        let request = self.client.post(&self.predict_url).json(&payload);
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "prediction request failed");
                return ApiOutcome::TransportError {
                    cause: describe(&e),
                };
            }
        };

        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status, error = %e, "failed to read prediction response");
                return ApiOutcome::TransportError {
                    cause: describe(&e),
                };
            }
        };

        let outcome = classify(status, &body);
        info!(status, outcome = outcome.kind(), "prediction response");
        outcome
    }
}

/// The error with its source chain, e.g.
/// `error sending request for url (...): tcp connect error: Connection refused`.
fn describe(err: &reqwest::Error) -> String {
    let mut out = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    out
}
