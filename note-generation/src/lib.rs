//! Clinical Note Generation for Scribe Engine
//!
//! Turns a dictated encounter transcript into a structured clinical note:
//! a SOAP note for the `medical` domain or a dental encounter note for the
//! `dental` domain.
//!
//! # Fallback Tiers
//!
//! 1. **Secondary** - OpenAI-compatible chat completions in JSON mode
//! 2. **Primary** - Gemini, trying each candidate model, then the v1 REST endpoint
//! 3. **Secondary again** - one more attempt when running in `auto` mode
//! 4. **Offline** - deterministic template with best-effort name extraction
//!
//! The order is driven by [`ProviderPreference`]. Provider output is cleaned
//! and parsed by escalating JSON recovery strategies, then validated against
//! the domain's required fields. A note missing a required field is treated
//! as a failure, never as a partial success.
//!
//! [`NoteGenerator::generate`] never returns an error; when every tier fails
//! the caller receives an offline note whose `_error` field describes why.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use note_generation::{Domain, NoteGenerationConfig, NoteGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NoteGenerationConfig::from_env()?;
//! let generator = NoteGenerator::new(&config)?;
//!
//! let note = generator
//!     .generate("Patient reports a dry cough for three days...", Domain::Medical)
//!     .await;
//!
//! if note.is_fallback() {
//!     tracing::warn!(error = ?note.error(), "Using offline note");
//! }
//! println!("{}", serde_json::to_string_pretty(&note)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod parsing;
pub mod prompts;
pub mod providers;
pub mod service;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use service::*;
