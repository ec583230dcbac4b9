//! The production [`Handlers`]: live discovery and API calls.

use super::args::{ExecuteArgs, ShowArgs};
use super::console::Console;
use super::dispatch::Handlers;
use super::{execute, show};
use crate::error::Result;
use crate::storage::Settings;

/// Handlers backed by the discovery service and real API calls.
///
/// Settings are resolved from the environment and config file when a
/// subcommand runs, so `-v` and usage errors never touch the config file.
#[derive(Debug, Clone, Default)]
pub struct ApiHandlers {
    settings: Option<Settings>,
}

impl ApiHandlers {
    #[must_use]
    pub const fn new() -> Self {
        Self { settings: None }
    }

    /// Handlers with fixed settings instead of resolving them per run.
    #[must_use]
    pub const fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    fn settings(&self) -> Result<Settings> {
        match &self.settings {
            Some(settings) => Ok(settings.clone()),
            None => Ok(Settings::resolve()?),
        }
    }
}

impl Handlers for ApiHandlers {
    async fn show(&self, args: &ShowArgs, console: &dyn Console) -> Result<()> {
        show::execute(args, &self.settings()?, console).await
    }

    async fn execute(&self, args: &ExecuteArgs, console: &dyn Console) -> Result<()> {
        execute::execute(args, &self.settings()?, console).await
    }
}
