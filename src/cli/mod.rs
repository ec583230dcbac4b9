//! Command line: argument parsing, dispatch, and the subcommands.

pub mod args;
pub mod console;
pub mod dispatch;
pub mod execute;
pub mod handlers;
pub mod resolve;
pub mod show;

pub use args::{Cli, Commands, ExecuteArgs, SUBCOMMANDS, ShowArgs};
pub use console::{Console, DiagnosticLog, StdConsole, StderrLog};
pub use dispatch::{Dispatcher, ExitOutcome, Handlers, VERSION};
pub use handlers::ApiHandlers;
pub use resolve::{ParsedInvocation, Selection, UsageError, resolve, usage_text};
