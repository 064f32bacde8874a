pub mod gemini;
pub mod openai;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::Domain;
use crate::error::{GenerationError, GenerationResult};

/// A validated note body returned by a provider
#[derive(Debug, Clone)]
pub struct ProviderNote {
    pub fields: Map<String, Value>,
    pub model: String,
}

/// One failed call, kept for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct AttemptFailure {
    pub provider: &'static str,
    pub model: Option<String>,
    pub kind: &'static str,
    pub message: String,
}

impl AttemptFailure {
    pub fn new(provider: &'static str, model: Option<&str>, error: &GenerationError) -> Self {
        Self {
            provider,
            model: model.map(str::to_string),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of running an ordered list of attempts
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// First successful attempt, plus the failures that preceded it
    Success {
        value: T,
        failures: Vec<AttemptFailure>,
    },
    /// Every attempt failed
    Exhausted {
        last_error: GenerationError,
        failures: Vec<AttemptFailure>,
    },
}

impl<T> AttemptOutcome<T> {
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            Self::Success { failures, .. } | Self::Exhausted { failures, .. } => failures,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Prepend earlier failures, keeping chronological order.
    pub fn after(self, mut earlier: Vec<AttemptFailure>) -> Self {
        match self {
            Self::Success { value, failures } => {
                earlier.extend(failures);
                Self::Success {
                    value,
                    failures: earlier,
                }
            }
            Self::Exhausted {
                last_error,
                failures,
            } => {
                earlier.extend(failures);
                Self::Exhausted {
                    last_error,
                    failures: earlier,
                }
            }
        }
    }
}

/// Trait for generative note providers
#[async_trait]
pub trait NoteProvider: Send + Sync {
    /// Short provider label for logs and reports
    fn name(&self) -> &'static str;

    /// Produce a validated note body for `transcript`.
    async fn generate(&self, domain: Domain, transcript: &str) -> AttemptOutcome<ProviderNote>;
}

/// Try `candidates` in order, stopping at the first success.
pub(crate) async fn first_success<T, F, Fut>(
    provider: &'static str,
    candidates: &[String],
    mut attempt: F,
) -> AttemptOutcome<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = GenerationResult<T>>,
{
    let mut failures = Vec::new();
    let mut last_error = None;

    for model in candidates {
        match attempt(model.clone()).await {
            Ok(value) => return AttemptOutcome::Success { value, failures },
            Err(err) => {
                warn!(
                    provider = provider,
                    model = %model,
                    error_kind = err.kind(),
                    error = %err,
                    "Provider attempt failed, trying next candidate"
                );
                failures.push(AttemptFailure::new(provider, Some(model), &err));
                last_error = Some(err);
            }
        }
    }

    AttemptOutcome::Exhausted {
        last_error: last_error.unwrap_or_else(|| {
            GenerationError::Config(format!("{} has no candidate models", provider))
        }),
        failures,
    }
}

/// HTTP client shared by the built-in providers.
pub fn build_http_client(timeout_secs: u64) -> GenerationResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GenerationError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a transport failure, dropping the URL from the message.
pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> GenerationError {
    GenerationError::ProviderTransport {
        provider,
        message: err.without_url().to_string(),
    }
}

/// Turn a non-success HTTP response into a redacted status error.
pub(crate) async fn status_error(provider: &'static str, response: reqwest::Response) -> GenerationError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GenerationError::ProviderStatus {
        provider,
        status,
        body: logger_redacted::preview(body.trim(), 200),
    }
}
