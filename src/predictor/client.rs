//! Prediction service client
//!
//! One JSON exchange: POST the civic inputs, read back a verdict.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{CivicInputs, PredictionResult};
use crate::config::PredictorConfig;
use crate::error::{CivicError, Result};

pub const DEFAULT_ENDPOINT: &str = "/predict";

/// Error body the CivicTwin service sends with 4xx responses
#[derive(Deserialize)]
struct ServiceErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    url: String,
}

impl PredictionClient {
    pub fn new(config: &PredictorConfig) -> Result<Self> {
        Self::with_url(join_url(&config.base_url, &config.endpoint))
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Client posting to an exact URL, with no timeout of its own.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    /// Bound each exchange, body included. Elapsing it is a `CivicError::Network`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CivicError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the inputs and parse the verdict.
    pub async fn submit(&self, inputs: &CivicInputs) -> Result<PredictionResult> {
        tracing::debug!("POST {} {:?}", self.url, inputs);

        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(inputs)
            .send()
            .await
            .map_err(CivicError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(CivicError::Network)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServiceErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            tracing::warn!("Prediction service returned {}: {}", status, message);
            return Err(CivicError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let result = PredictionResult::from_value(value)?;

        tracing::info!(
            "Prediction received: mood={} score={}",
            result.mood_text(),
            result.score_text()
        );

        Ok(result)
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
