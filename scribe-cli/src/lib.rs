//! Scribe Engine operator CLI
//!
//! Wires the entitlement gate and the note generation pipeline together
//! against a YAML-seeded in-memory store, for local evaluation and smoke
//! testing of provider credentials.

pub mod cli;
pub mod commands;
pub mod seed;
