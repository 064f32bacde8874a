//! Entitlement Service for Scribe Engine
//!
//! Decides whether a clinician may generate a note and tracks monthly usage:
//! - Administrator bypass and account locking
//! - Email whitelist that skips plan limits
//! - Subscription status and period-end checks
//! - Per-plan monthly limits keyed by calendar month (UTC, `YYYY-MM`)
//! - Atomic usage reservation for concurrent requests
//!
//! Storage sits behind [`EntitlementRepository`]; an in-memory
//! implementation backed by `dashmap` ships for development and tests.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::*;
pub use models::*;
pub use repository::*;
pub use service::*;
