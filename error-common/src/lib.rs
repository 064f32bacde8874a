//! Common error handling utilities for Scribe Engine
//!
//! This crate provides the error vocabulary shared by the note generation
//! pipeline, the entitlement gate and the operator CLI. Component crates keep
//! their own `thiserror` enums and convert into [`ScribeError`] at the edge,
//! where a stable error code is attached for API responses and client
//! messaging.
//!
//! # Error Categories
//!
//! - **Validation**: malformed input or generated notes missing required fields
//! - **Provider**: failures talking to a generative text provider
//! - **Entitlement**: a denied request, carrying a reason code
//! - **Storage**: failures of the storage collaborator
//! - **Config**: invalid or missing configuration
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ErrorContext, ScribeError};
//!
//! let err = ScribeError::Entitlement {
//!     code: codes::entitlement::LIMIT_EXCEEDED,
//!     message: "Monthly note limit reached".to_string(),
//! };
//! assert_eq!(err.code(), "ENT_6004");
//!
//! let context = ErrorContext::new()
//!     .with_user_id("6f1c...".to_string())
//!     .add_context("domain", "dental");
//! error_common::log_error("generate", &err, &context);
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
