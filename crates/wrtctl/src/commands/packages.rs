//! Package command handlers.

use wrtctl_core::Device;

use crate::cli::{GlobalOpts, PackagesArgs, PackagesCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &Device,
    args: PackagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PackagesCommand::Update => {
            device.update_packages().await?;
            if !global.quiet {
                eprintln!("Package index updated");
            }
            Ok(())
        }

        PackagesCommand::List => {
            let packages = device.list_packages().await?;
            let out = output::render_map(&global.output, &packages, "Package", "Version")?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PackagesCommand::Remove { name } => {
            device.remove_package(&name).await?;
            if !global.quiet {
                eprintln!("Removed {name}");
            }
            Ok(())
        }
    }
}
