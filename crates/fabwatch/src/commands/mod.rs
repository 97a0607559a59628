//! Command dispatch: bridges CLI args -> core components -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod modules;
pub mod sensors;
pub mod watch;

use fabwatch_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(console, args, global).await,
        Command::Sensors(args) => sensors::handle(console, args, global).await,
        Command::Alerts(args) => alerts::handle(console, args, global).await,
        // Modules, Config, and Completions are handled before dispatch
        Command::Modules | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
