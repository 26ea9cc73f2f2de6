//! HTTP client for the animation-generation endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::GenerationOutcome,
    protocol::{GenerateRequest, GenerateResponse, HealthResponse},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_SUCCESS_TEXT: &str = "Animation generated successfully";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to generate animation. Please try a shorter, more concise prompt.";
pub const CONNECTION_FAILURE_MESSAGE: &str = "Error: Could not connect to the server.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed to reach the server: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("generation endpoint answered with status {status}")]
    Status {
        status: StatusCode,
        body: Option<GenerateResponse>,
    },
    #[error("generation endpoint returned a malformed body: {0}")]
    Decode(String),
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Anything that can turn a prompt into a resolved outcome. Failures are part of the outcome.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationOutcome;
}

pub struct HttpGenerationClient {
    http: Client,
    endpoint_url: String,
}

impl HttpGenerationClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Single POST with `{ "prompt": ... }`. Non-2xx answers are returned as
    /// [`GenerationError::Status`] with whatever body could be decoded.
    pub async fn request(&self, prompt: &str) -> Result<GenerateResponse, GenerationError> {
        let res = self
            .http
            .post(&self.endpoint_url)
            .json(&GenerateRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = res.status();
        let bytes = res.bytes().await.map_err(GenerationError::Transport)?;
        let body = serde_json::from_slice::<GenerateResponse>(&bytes);

        if !status.is_success() {
            return Err(GenerationError::Status {
                status,
                body: body.ok(),
            });
        }
        body.map_err(|err| GenerationError::Decode(err.to_string()))
    }

    pub fn health_url(&self) -> Result<Url, GenerationError> {
        let invalid = |reason: String| GenerationError::InvalidUrl {
            url: self.endpoint_url.clone(),
            reason,
        };
        let endpoint = Url::parse(&self.endpoint_url).map_err(|err| invalid(err.to_string()))?;
        endpoint
            .join("/health")
            .map_err(|err| invalid(err.to_string()))
    }

    pub async fn health_check(&self) -> Result<HealthResponse, GenerationError> {
        let res = self
            .http
            .get(self.health_url()?)
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(GenerationError::Status { status, body: None });
        }
        res.json::<HealthResponse>()
            .await
            .map_err(|err| GenerationError::Decode(err.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let outcome = classify(self.request(prompt).await);
        match &outcome {
            GenerationOutcome::Succeeded { video_url, .. } => {
                info!(endpoint = %self.endpoint_url, %video_url, "generation succeeded");
            }
            GenerationOutcome::Failed { message } => {
                warn!(endpoint = %self.endpoint_url, %message, "generation failed");
            }
        }
        outcome
    }
}

/// Reduces a raw response to what the conversation shows.
pub fn classify(result: Result<GenerateResponse, GenerationError>) -> GenerationOutcome {
    match result {
        Ok(body) if body.success => match non_blank(body.video_url) {
            Some(video_url) => GenerationOutcome::Succeeded {
                text: non_blank(body.text).unwrap_or_else(|| DEFAULT_SUCCESS_TEXT.to_string()),
                video_url,
            },
            None => generic_failure(),
        },
        Ok(body) => server_failure(body),
        Err(GenerationError::Status {
            body: Some(body), ..
        }) if !body.success => server_failure(body),
        Err(GenerationError::Transport(err)) => {
            warn!(error = %err, "generation transport failure");
            GenerationOutcome::Failed {
                message: CONNECTION_FAILURE_MESSAGE.to_string(),
            }
        }
        Err(err) => {
            warn!(error = %err, "unusable generation response");
            generic_failure()
        }
    }
}

fn server_failure(body: GenerateResponse) -> GenerationOutcome {
    match non_blank(body.error) {
        Some(message) => GenerationOutcome::Failed { message },
        None => generic_failure(),
    }
}

fn generic_failure() -> GenerationOutcome {
    GenerationOutcome::Failed {
        message: GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/generation_tests.rs"]
mod tests;
