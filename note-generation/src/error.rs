use error_common::{codes, ScribeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider {0} is not configured")]
    NotConfigured(&'static str),

    #[error("Transport error from {provider}: {message}")]
    ProviderTransport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    ProviderEmptyResponse(&'static str),

    #[error("Could not recover a JSON object from response: {0}")]
    ResponseParse(String),

    #[error("Note is missing required field(s): {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl GenerationError {
    /// Short machine-readable kind, used in attempt reports and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NotConfigured(_) => "not_configured",
            Self::ProviderTransport { .. } => "provider_transport",
            Self::ProviderStatus { .. } => "provider_status",
            Self::ProviderEmptyResponse(_) => "provider_empty_response",
            Self::ResponseParse(_) => "response_parse",
            Self::Validation(_) => "validation",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => codes::config::INVALID_CONFIGURATION,
            Self::NotConfigured(_) => codes::generation::PROVIDER_NOT_CONFIGURED,
            Self::ProviderTransport { .. } => codes::generation::PROVIDER_TRANSPORT,
            Self::ProviderStatus { .. } => codes::generation::PROVIDER_STATUS,
            Self::ProviderEmptyResponse(_) => codes::generation::EMPTY_RESPONSE,
            Self::ResponseParse(_) => codes::generation::RESPONSE_PARSE,
            Self::Validation(_) => codes::generation::NOTE_VALIDATION,
        }
    }
}

impl From<GenerationError> for ScribeError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Config(msg) => ScribeError::ConfigError(msg),
            GenerationError::Validation(_) => ScribeError::ValidationError(err.to_string()),
            other => ScribeError::ProviderError(other.to_string()),
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;
