//! Logging for Scribe Engine with PHI/PII redaction
//!
//! Clinical transcripts and provider error bodies routinely contain patient
//! identifiers. Nothing free-form is logged without first passing through
//! [`redact`] or [`preview`], which mask emails, phone numbers, SSNs and card
//! numbers (optionally replacing them with a short SHA-256 tag so repeated
//! values can still be correlated).
//!
//! [`init_tracing`] installs the global `tracing` subscriber: pretty output for
//! development, JSON lines for production, filtered by `RUST_LOG` or the
//! configured default level.
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_tracing, preview, LoggerConfig};
//!
//! init_tracing(&LoggerConfig::from_env()).expect("logger init");
//!
//! let transcript = "My number is (555) 123-4567 and my tooth hurts";
//! tracing::info!(transcript = %preview(transcript, 40), "Received transcript");
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use error_common::ScribeError;
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

impl From<LoggerError> for ScribeError {
    fn from(err: LoggerError) -> Self {
        ScribeError::ConfigError(err.to_string())
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "{level},hyper=info,reqwest=info",
            level = config.log_level
        ))
        .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.with_source_location)
                    .with_line_number(config.with_source_location)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init(),
    }
    .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}
