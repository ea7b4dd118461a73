//! Ping, run, and reboot handlers.

use std::io::Write;

use wrtctl_core::{Device, RunResult};

use crate::cli::{GlobalOpts, OutputFormat, RunArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn ping(device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    if !device.ping().await {
        return Err(CliError::ConnectionFailed {
            target: device.config().target(),
            reason: "no answer from the device shell".into(),
        });
    }
    output::print_output("pong", global.quiet);
    Ok(())
}

fn detail(r: &RunResult) -> String {
    format!(
        "Exit:   {}\nStdout:\n{}\nStderr:\n{}",
        r.exit_code, r.stdout, r.stderr
    )
}

pub async fn run(device: &Device, args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let line = util::command_line(&args.command);
    let result = device.run(&line).await?;

    match global.output {
        // Pass remote output through untouched
        OutputFormat::Table | OutputFormat::Plain => {
            if !global.quiet {
                let _ = write_stream(&mut std::io::stdout().lock(), &result.stdout);
                let _ = write_stream(&mut std::io::stderr().lock(), &result.stderr);
            }
        }
        _ => {
            let out = output::render_single(&global.output, &result, detail, |r| r.stdout.clone())?;
            output::print_output(&out, global.quiet);
        }
    }

    if result.success() {
        Ok(())
    } else {
        Err(CliError::RemoteExit {
            status: result.exit_code,
        })
    }
}

fn write_stream(w: &mut impl Write, text: &str) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    writeln!(w, "{text}")
}

pub async fn reboot(device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    let prompt = format!("Reboot {}?", device.config().host);
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }
    device.reboot().await?;
    if !global.quiet {
        eprintln!("Reboot initiated");
    }
    Ok(())
}
