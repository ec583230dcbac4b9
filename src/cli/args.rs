//! CLI argument definitions using clap.
//!
//! The `Commands` enum is the subcommand registry: each variant names a
//! subcommand and owns its option grammar.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for the Google API.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gcall")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Show application version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show services, methods and method schemas
    Show(ShowArgs),

    /// Execute an API method
    Execute(ExecuteArgs),
}

/// Names of the registered subcommands, in help order.
pub const SUBCOMMANDS: &[&str] = &["show", "execute"];

impl Commands {
    /// Registered name of this subcommand.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Show(_) => "show",
            Self::Execute(_) => "execute",
        }
    }
}

/// Arguments for the `show` command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowArgs {
    /// Service to inspect (e.g. drive or drive:v3); lists all APIs when omitted
    #[arg(value_name = "SERVICE[:VERSION]")]
    pub service: Option<String>,

    /// Method to describe (e.g. files.list); lists all methods when omitted
    #[arg(value_name = "RESOURCE.METHOD", requires = "service")]
    pub method: Option<String>,
}

/// Arguments for the `execute` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExecuteArgs {
    /// Service to call (e.g. drive or drive:v3)
    #[arg(value_name = "SERVICE[:VERSION]")]
    pub service: String,

    /// Method to call (e.g. files.list)
    #[arg(value_name = "RESOURCE.METHOD")]
    pub method: String,

    /// Request as JSON text, @FILE to read a file, or - for stdin
    #[arg(value_name = "REQUEST", default_value = "{}")]
    pub request: String,

    /// Authorized-user credentials file used for the token exchange
    /// [default: $GCALL_CREDENTIALS, then the config file]
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Bearer token to send as-is (skips the token exchange)
    /// [default: $GCALL_ACCESS_TOKEN]
    #[arg(long, value_name = "TOKEN")]
    pub access_token: Option<String>,
}
