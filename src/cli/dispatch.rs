//! Dispatch and error normalization.
//!
//! Runs the resolved subcommand and maps its failure, if any, to exactly one
//! exit code plus diagnostic lines. This is the only place in gcall where
//! [`CommandError`] values are handled; nothing below retries or reports them.

use std::ffi::OsString;

use super::args::{ExecuteArgs, ShowArgs};
use super::console::{Console, DiagnosticLog};
use super::resolve::{ParsedInvocation, Selection, UsageError, resolve, usage_text};
use crate::error::{CommandError, ExitCode, Result};

/// Version string printed for `-v` / `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subcommand handlers.
///
/// Handlers write their own output through `console` and report failures by
/// returning a [`CommandError`].
#[allow(async_fn_in_trait)]
pub trait Handlers {
    /// Run `show`.
    async fn show(&self, args: &ShowArgs, console: &dyn Console) -> Result<()>;
    /// Run `execute`.
    async fn execute(&self, args: &ExecuteArgs, console: &dyn Console) -> Result<()>;
}

impl<T: Handlers + ?Sized> Handlers for &T {
    async fn show(&self, args: &ShowArgs, console: &dyn Console) -> Result<()> {
        (**self).show(args, console).await
    }

    async fn execute(&self, args: &ExecuteArgs, console: &dyn Console) -> Result<()> {
        (**self).execute(args, console).await
    }
}

/// What a single invocation ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Process exit code.
    pub code: ExitCode,
    /// Diagnostic lines written to the log. Empty unless a classified
    /// failure occurred.
    pub diagnostics: Vec<String>,
}

impl ExitOutcome {
    /// Successful outcome.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            code: ExitCode::Success,
            diagnostics: Vec::new(),
        }
    }

    /// Usage error or nothing to do. Usage text is not a diagnostic.
    #[must_use]
    pub const fn usage() -> Self {
        Self {
            code: ExitCode::Usage,
            diagnostics: Vec::new(),
        }
    }

    /// Classified failure.
    #[must_use]
    pub const fn failure(code: ExitCode, diagnostics: Vec<String>) -> Self {
        Self { code, diagnostics }
    }

    /// The diagnostic text, lines joined with newlines.
    #[must_use]
    pub fn diagnostic(&self) -> Option<String> {
        if self.diagnostics.is_empty() {
            None
        } else {
            Some(self.diagnostics.join("\n"))
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == ExitCode::Success
    }
}

impl From<ExitOutcome> for std::process::ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        outcome.code.into()
    }
}

/// Runs one invocation against a set of handlers.
pub struct Dispatcher<H, C, L> {
    handlers: H,
    console: C,
    log: L,
}

impl<H, C, L> Dispatcher<H, C, L>
where
    H: Handlers,
    C: Console,
    L: DiagnosticLog,
{
    pub const fn new(handlers: H, console: C, log: L) -> Self {
        Self {
            handlers,
            console,
            log,
        }
    }

    /// Resolve `args` and dispatch the result.
    ///
    /// # Errors
    ///
    /// Unclassified failures are returned as-is; see [`Self::dispatch`].
    pub async fn run<I, T>(&self, args: I) -> anyhow::Result<ExitOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.dispatch(resolve(args)).await
    }

    /// Dispatch a resolved command line.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for failures outside the four classified
    /// categories. Those are not normalized: the caller is expected to let
    /// them end the process with their full context.
    pub async fn dispatch(
        &self,
        resolved: std::result::Result<ParsedInvocation, UsageError>,
    ) -> anyhow::Result<ExitOutcome> {
        let invocation = match resolved {
            Ok(invocation) => invocation,
            Err(usage) => {
                tracing::debug!(kind = ?usage.kind, "Command line rejected");
                self.console.err(&usage.message);
                return Ok(ExitOutcome::usage());
            }
        };

        match self.invoke(&invocation).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => self.classify(err),
        }
    }

    async fn invoke(&self, invocation: &ParsedInvocation) -> Result<ExitOutcome> {
        if invocation.wants_version {
            self.console.out(VERSION);
            return Ok(ExitOutcome::success());
        }

        match &invocation.selection {
            Selection::Show(args) => {
                tracing::debug!(subcommand = "show", "Dispatching");
                self.handlers.show(args, &self.console).await?;
            }
            Selection::Execute(args) => {
                tracing::debug!(subcommand = "execute", "Dispatching");
                self.handlers.execute(args, &self.console).await?;
            }
            Selection::None => {
                self.console.err(&usage_text());
                return Ok(ExitOutcome::usage());
            }
        }

        Ok(ExitOutcome::success())
    }

    fn classify(&self, err: CommandError) -> anyhow::Result<ExitOutcome> {
        let (Some(category), Some(code), Some(lines)) =
            (err.category(), err.exit_code(), err.diagnostic_lines())
        else {
            tracing::debug!("Unclassified failure, propagating");
            return Err(match err {
                CommandError::Other(inner) => inner,
                other => anyhow::Error::new(other),
            });
        };

        tracing::debug!(
            category = %category,
            priority = category.priority(),
            code = i32::from(code),
            "Classified failure"
        );
        for line in &lines {
            self.log.error(line);
        }
        Ok(ExitOutcome::failure(code, lines))
    }
}
