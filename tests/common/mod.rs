//! Shared helpers for integration tests.
//!
//! - `fixtures`: wiremock mounts for the discovery, API and token endpoints
//! - `logger`: per-test structured logging

pub mod fixtures;
pub mod logger;
