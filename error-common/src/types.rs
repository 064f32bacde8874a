use thiserror::Error;

use crate::codes;
use crate::context::ErrorContext;

/// Simplified error enum for common use cases
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Generative provider errors
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Entitlement denials surfaced as errors at an API edge
    #[error("Entitlement denied ({code}): {message}")]
    Entitlement { code: &'static str, message: String },

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Lookup of a record that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScribeError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::ProviderError(_) => codes::generation::PROVIDER_TRANSPORT,
            Self::Entitlement { code, .. } => code,
            Self::StorageError(_) => codes::storage::QUERY_FAILED,
            Self::NotFound(_) => codes::storage::RECORD_NOT_FOUND,
            Self::ConfigError(_) => codes::config::INVALID_CONFIGURATION,
            Self::InternalError(_) | Self::Other(_) => codes::INTERNAL,
        }
    }

    /// Short category name used as a structured log field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation",
            Self::ProviderError(_) => "provider",
            Self::Entitlement { .. } => "entitlement",
            Self::StorageError(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::ConfigError(_) => "config",
            Self::InternalError(_) | Self::Other(_) => "internal",
        }
    }

    /// Whether the caller should surface a 5xx-equivalent response
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::StorageError(_) | Self::ConfigError(_) | Self::InternalError(_) | Self::Other(_)
        )
    }
}

/// Result type alias for Scribe Engine operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Log an error with its code and context
pub fn log_error(operation: &str, error: &ScribeError, context: &ErrorContext) {
    tracing::error!(
        operation = operation,
        error_code = error.code(),
        error_type = error.error_type(),
        request_id = context.request_id.as_deref().unwrap_or("-"),
        user_id = context.user_id.as_deref().unwrap_or("-"),
        error = %error,
        "Scribe error occurred"
    );
}
