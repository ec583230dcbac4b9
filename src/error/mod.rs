//! Error types for gcall.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Every collaborator returns [`CommandError`]. Four of its variants are
//! *classified*: the dispatcher turns them into a diagnostic and an exit code.
//! They are checked in this order:
//! - **Domain**: a rule of our own was violated (bad discovery document,
//!   unknown method, malformed request)
//! - **Transport**: the remote API answered with a non-success status
//! - **AuthExchange**: the OAuth 2 token exchange failed
//! - **PayloadDecode**: a body that had to be JSON was not
//!
//! Anything else is carried as [`CommandError::Other`] and is deliberately
//! left unclassified so it surfaces with its full cause chain.

mod domain;

use thiserror::Error;

pub use domain::DomainError;

// =============================================================================
// Error Categories
// =============================================================================

/// Classified failure categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Internal business rule violated.
    Domain,
    /// Remote endpoint rejected the request.
    Transport,
    /// Credential negotiation failed.
    AuthExchange,
    /// Response body was not valid JSON.
    PayloadDecode,
}

impl ErrorCategory {
    /// All categories, highest priority first.
    pub const ALL: &'static [Self] = &[
        Self::Domain,
        Self::Transport,
        Self::AuthExchange,
        Self::PayloadDecode,
    ];

    /// Position in the classification order (1 is checked first).
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Domain => 1,
            Self::Transport => 2,
            Self::AuthExchange => 3,
            Self::PayloadDecode => 4,
        }
    }

    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Domain => "Domain error",
            Self::Transport => "Transport error",
            Self::AuthExchange => "OAuth 2 exchange error",
            Self::PayloadDecode => "Payload decode error",
        }
    }

    /// Exit code for failures in this category.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            // Token exchange failures are failures: they never report success.
            Self::Domain | Self::Transport | Self::AuthExchange | Self::PayloadDecode => {
                ExitCode::Failure
            }
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// A classified failure (domain, transport, auth exchange, payload decode)
    Failure = 1,
    /// Usage error, help requested, or no subcommand selected
    Usage = 2,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

// =============================================================================
// Command Errors
// =============================================================================

/// Error returned by every subcommand handler and the collaborators below it.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A domain rule was violated; the message is shown verbatim.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The API answered with a non-success status.
    #[error("Server error response ({status}): {}", trimmed_body(.body))]
    Transport { status: u16, body: Vec<u8> },

    /// The OAuth 2 token exchange failed.
    #[error("OAuth 2 error: {message}")]
    AuthExchange { message: String },

    /// A body that had to be JSON failed to parse.
    #[error("JSONDecodeError: {message}")]
    PayloadDecode { message: String, document: String },

    /// Anything else. Not classified by the dispatcher.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    /// Build a transport error from a status code and raw body.
    pub fn transport(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Build an auth exchange error.
    pub fn auth_exchange(message: impl Into<String>) -> Self {
        Self::AuthExchange {
            message: message.into(),
        }
    }

    /// Build a payload decode error from the parser message and the raw text.
    pub fn payload_decode(message: impl Into<String>, document: impl Into<String>) -> Self {
        Self::PayloadDecode {
            message: message.into(),
            document: document.into(),
        }
    }

    /// Classification of this error, `None` for unclassified failures.
    #[must_use]
    pub const fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Domain(_) => Some(ErrorCategory::Domain),
            Self::Transport { .. } => Some(ErrorCategory::Transport),
            Self::AuthExchange { .. } => Some(ErrorCategory::AuthExchange),
            Self::PayloadDecode { .. } => Some(ErrorCategory::PayloadDecode),
            Self::Other(_) => None,
        }
    }

    /// Exit code for classified errors.
    #[must_use]
    pub fn exit_code(&self) -> Option<ExitCode> {
        self.category().map(ErrorCategory::exit_code)
    }

    /// Diagnostic lines for classified errors, `None` for unclassified ones.
    ///
    /// Every category yields one line except payload decode failures, which
    /// also echo the offending document.
    #[must_use]
    pub fn diagnostic_lines(&self) -> Option<Vec<String>> {
        match self {
            Self::Domain(_) | Self::Transport { .. } | Self::AuthExchange { .. } => {
                Some(vec![self.to_string()])
            }
            Self::PayloadDecode { document, .. } => {
                Some(vec![self.to_string(), format!("JSON was: {document}")])
            }
            Self::Other(_) => None,
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.into())
    }
}

fn trimmed_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body).trim().to_string()
}

/// Result type alias for handler operations.
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_trims_body() {
        let err = CommandError::transport(404, b"  not found  ".to_vec());
        assert_eq!(err.to_string(), "Server error response (404): not found");
    }

    #[test]
    fn transport_message_survives_invalid_utf8() {
        let err = CommandError::transport(500, vec![0xff, b'o', b'k', b'\n']);
        assert_eq!(err.to_string(), "Server error response (500): \u{fffd}ok");
    }

    #[test]
    fn payload_decode_yields_two_lines() {
        let err = CommandError::payload_decode("Expecting value", "{bad");
        assert_eq!(
            err.diagnostic_lines().unwrap(),
            vec!["JSONDecodeError: Expecting value", "JSON was: {bad"]
        );
    }

    #[test]
    fn domain_message_is_verbatim() {
        let err = CommandError::from(DomainError::InvalidRequest("bad field".to_string()));
        assert_eq!(err.diagnostic_lines().unwrap(), vec!["bad field"]);
        assert_eq!(err.category(), Some(ErrorCategory::Domain));
    }

    #[test]
    fn other_errors_are_unclassified() {
        let err = CommandError::Other(anyhow::anyhow!("boom"));
        assert!(err.category().is_none());
        assert!(err.exit_code().is_none());
        assert!(err.diagnostic_lines().is_none());
    }

    #[test]
    fn auth_exchange_is_a_failure() {
        let err = CommandError::auth_exchange("invalid_grant");
        assert_eq!(err.to_string(), "OAuth 2 error: invalid_grant");
        assert_eq!(err.exit_code(), Some(ExitCode::Failure));
    }

    #[test]
    fn priorities_follow_declaration_order() {
        let priorities: Vec<u8> = ErrorCategory::ALL.iter().map(|c| c.priority()).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4]);
    }

    #[test]
    fn exit_codes_convert_to_i32() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Failure), 1);
        assert_eq!(i32::from(ExitCode::Usage), 2);
    }
}
