//! Command dispatch: bridges CLI args -> device operations -> output formatting.

pub mod config_cmd;
pub mod facts;
pub mod network;
pub mod packages;
pub mod system;
pub mod uci;
pub mod util;

use wrtctl_core::Device;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Ping => system::ping(device, global).await,
        Command::Facts(args) => facts::handle(device, args, global).await,
        Command::Packages(args) => packages::handle(device, args, global).await,
        Command::Network(args) => network::handle(device, args, global).await,
        Command::Uci(args) => uci::handle(device, args, global).await,
        Command::Run(args) => system::run(device, args, global).await,
        Command::Reboot => system::reboot(device, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not take a device".into(),
        )),
    }
}
