//! Compute client trait and HTTP implementation.

use async_trait::async_trait;
use tracing::{debug, info};

use gradpath_core::{ComputeSettings, Error, Result};

use crate::wire::{TrainingRequest, TrainingResponse};

/// Abstraction over the RL training backend. One call per precompute job;
/// retry is left to the reconciliation pass, never done here.
#[async_trait]
pub trait ComputeClient: Send + Sync {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainingResponse>;
}

/// HTTP client for the training service.
pub struct HttpComputeClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpComputeClient {
    pub fn new(settings: &ComputeSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ComputeClient for HttpComputeClient {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainingResponse> {
        let url = format!("{}/recommend", self.base_url);
        debug!(
            "Training request for student {} ({} episodes) -> {}",
            request.student_id, request.episodes, url
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Compute(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Compute(format!("trainer returned {}: {}", status, body)));
        }

        let parsed: TrainingResponse = response
            .json()
            .await
            .map_err(|e| Error::Compute(format!("invalid trainer response: {}", e)))?;

        info!(
            "Training response for student {}: {} slates, {} terms",
            request.student_id,
            parsed.recommended_slates.len(),
            parsed.terms.len()
        );
        Ok(parsed)
    }
}
