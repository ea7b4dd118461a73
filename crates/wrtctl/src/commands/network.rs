//! Network command handlers.

use wrtctl_core::Device;

use crate::cli::{GlobalOpts, NetworkArgs, NetworkCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &Device,
    args: NetworkArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NetworkCommand::Restart => {
            device.network_restart().await?;
            if !global.quiet {
                eprintln!("Network restarted");
            }
            Ok(())
        }

        NetworkCommand::Reload => {
            device.network_reload().await?;
            if !global.quiet {
                eprintln!("Network reloaded");
            }
            Ok(())
        }

        NetworkCommand::Interfaces => {
            let names = device.interfaces().await?;
            let out = output::render_single(
                &global.output,
                &names,
                |n| n.join("\n"),
                |n| n.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworkCommand::Device { name } => {
            let reply = device.device_status(&name).await?;
            let out = output::render_value(&global.output, &reply.into_value())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworkCommand::Interface { name } => {
            let reply = device.interface_status(&name).await?;
            let out = output::render_value(&global.output, &reply.into_value())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
