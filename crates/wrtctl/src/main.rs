mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wrtctl_core::{Device, DeviceConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        if !matches!(err, CliError::RemoteExit { .. }) {
            eprintln!("{:?}", miette::Report::new(err));
        }
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a device connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wrtctl", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a device session
        cmd => {
            let device_config = build_device_config(&cli.global)?;
            let device = Device::new(device_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &device, &cli.global).await;
            device.disconnect().await;
            result
        }
    }
}

/// Build a `DeviceConfig` from the config file, profile, and CLI overrides.
fn build_device_config(global: &cli::GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = config::load_config()?;
    let profile_name = config::active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return config::resolve_profile(profile, &profile_name, &cfg, global);
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        return Err(commands::config_cmd::profile_not_found(&cfg, profile_name));
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config::config_path().display().to_string(),
    })?;
    config::from_flags(host, &cfg, global)
}
