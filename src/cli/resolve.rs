//! Command resolution: raw arguments to a [`ParsedInvocation`].
//!
//! Resolution is a pure parse. Nothing is printed here; the dispatcher decides
//! what to show for usage errors and empty command lines.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use super::args::{Cli, Commands, ExecuteArgs, ShowArgs};

/// Which subcommand was selected, with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No subcommand on the command line.
    None,
    /// `show` with its parsed options.
    Show(ShowArgs),
    /// `execute` with its parsed options.
    Execute(ExecuteArgs),
}

impl Selection {
    /// Registered name of the selected subcommand.
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Show(_) => Some("show"),
            Self::Execute(_) => Some("execute"),
        }
    }
}

impl From<Option<Commands>> for Selection {
    fn from(command: Option<Commands>) -> Self {
        match command {
            None => Self::None,
            Some(Commands::Show(args)) => Self::Show(args),
            Some(Commands::Execute(args)) => Self::Execute(args),
        }
    }
}

/// Result of resolving a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation {
    /// `-v` / `--version` was given. Takes precedence over the selection.
    pub wants_version: bool,
    /// Selected subcommand, if any.
    pub selection: Selection,
}

impl From<Cli> for ParsedInvocation {
    fn from(cli: Cli) -> Self {
        Self {
            wants_version: cli.version,
            selection: cli.command.into(),
        }
    }
}

/// The command line did not match the grammar, or help was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    /// What clap reported.
    pub kind: ErrorKind,
    /// Rendered message, including usage lines.
    pub message: String,
}

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.trim_end())
    }
}

impl std::error::Error for UsageError {}

impl From<clap::Error> for UsageError {
    fn from(err: clap::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.render().to_string(),
        }
    }
}

/// Resolve an argument vector. The first element is the program name.
///
/// # Errors
///
/// Returns [`UsageError`] for unknown flags or subcommands, missing required
/// values, and help requests.
pub fn resolve<I, T>(args: I) -> Result<ParsedInvocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let invocation = ParsedInvocation::from(cli);
    tracing::debug!(
        wants_version = invocation.wants_version,
        subcommand = invocation.selection.name().unwrap_or("none"),
        "Resolved command line"
    );
    Ok(invocation)
}

/// Top-level help text, printed when no subcommand is selected.
#[must_use]
pub fn usage_text() -> String {
    Cli::command().render_help().to_string()
}
