//! Domain errors: rule violations detected by gcall's own logic.

use std::path::PathBuf;

use thiserror::Error;

/// Domain errors are reported to the user with their message verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The discovery document does not have the expected shape.
    #[error("Invalid discovery document: {0}")]
    InvalidDiscoveryDocument(String),

    /// No API with this name is listed in the discovery directory.
    #[error("Service not found: {0}")]
    UnknownService(String),

    /// The service exists but does not expose this method.
    #[error("Method not found in {service}: {method}")]
    UnknownMethod { service: String, method: String },

    /// A `SERVICE[:VERSION]` reference could not be parsed.
    #[error("Invalid service reference '{0}' (expected SERVICE or SERVICE:VERSION)")]
    InvalidServiceRef(String),

    /// A `RESOURCE.METHOD` reference could not be parsed.
    #[error("Invalid method reference '{0}' (expected RESOURCE.METHOD)")]
    InvalidMethodRef(String),

    /// The request document is structurally wrong.
    #[error("{0}")]
    InvalidRequest(String),

    /// A required parameter was not supplied in the request.
    #[error("Missing required parameter for {method}: {name}")]
    MissingParameter { method: String, name: String },

    /// The request names a parameter the method does not declare.
    #[error("Unknown parameter for {method}: {name}")]
    UnknownParameter { method: String, name: String },

    /// The request file could not be read.
    #[error("Cannot read request file {}: {reason}", path.display())]
    RequestFileUnreadable { path: PathBuf, reason: String },

    /// The credentials file is missing, unreadable or malformed.
    #[error("Invalid credentials file {}: {reason}", path.display())]
    InvalidCredentials { path: PathBuf, reason: String },

    /// The configuration file or an override is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
