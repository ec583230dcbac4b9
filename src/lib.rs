//! gcall - call Google APIs from the command line
//!
//! Discovers APIs through the Google discovery service and executes their
//! methods with a JSON request document. The dispatcher in [`cli::dispatch`]
//! maps every failure to one exit code and a short diagnostic.

// Logging tests opt back in for `std::env::set_var`.
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod storage;

/// Fixtures and capture types shared by unit and integration tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{CommandError, DomainError, ErrorCategory, ExitCode, Result};
