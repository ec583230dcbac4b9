//! gcall - call Google APIs from the command line
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use gcall::cli::{ApiHandlers, Dispatcher, StdConsole, StderrLog};
use gcall::core::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<std::process::ExitCode> {
    logging::init_from_env();

    let dispatcher = Dispatcher::new(ApiHandlers::new(), StdConsole, StderrLog);
    let outcome = dispatcher.run(std::env::args_os()).await?;
    tracing::debug!(code = i32::from(outcome.code), "Exiting");
    Ok(outcome.into())
}
