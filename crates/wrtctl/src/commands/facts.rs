//! Facts command handler.

use std::collections::BTreeSet;
use std::fmt::Write;

use wrtctl_core::{Device, Facts};

use crate::cli::{FactsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".into()
    } else {
        items.join(", ")
    }
}

fn detail(f: &Facts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hostname:     {}", f.fqdn);
    let _ = writeln!(out, "Model:        {} {}", f.manufacturer, f.productname);
    let _ = writeln!(out, "CPU:          {}", f.cpumodel);
    let _ = writeln!(out, "Arch:         {}", f.cpuarch.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Memory:       {} MiB (swap {} MiB)", f.mem_total, f.swap_total);
    let _ = writeln!(out, "OS:           {}", f.osfullname);
    let _ = writeln!(out, "Release:      {}", f.osrelease);
    let _ = writeln!(
        out,
        "Kernel:       {} {}",
        f.kernel.as_deref().unwrap_or("-"),
        f.kernelrelease
    );
    let _ = writeln!(out, "Packages:     {}", join_or_dash(&f.osarch));
    let _ = writeln!(out, "IPv4 gateway: {}", f.ip4_gw.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "IPv6 gateway: {}", f.ip6_gw.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "DNS:          {}", join_or_dash(&f.dns.nameservers));

    let devices: BTreeSet<&String> = f
        .hwaddr_interfaces
        .keys()
        .chain(f.ip4_interfaces.keys())
        .chain(f.ip6_interfaces.keys())
        .collect();
    if !devices.is_empty() {
        let _ = writeln!(out, "\nInterfaces:");
        for dev in devices {
            let mac = f.hwaddr_interfaces.get(dev).map_or("-", String::as_str);
            let addrs: Vec<String> = f
                .ip4_interfaces
                .get(dev)
                .into_iter()
                .chain(f.ip6_interfaces.get(dev))
                .flatten()
                .cloned()
                .collect();
            let _ = writeln!(out, "  {dev:<12} {mac:<17}  {}", join_or_dash(&addrs));
        }
    }

    if let Some(ref flash) = f.flash {
        let _ = writeln!(out, "\nFlash ({} bytes):", flash.total_size);
        for (dev, part) in &flash.partitions {
            let _ = writeln!(out, "  {dev:<6} {:<14} {}", part.name, part.size);
        }
    }

    out.trim_end().to_string()
}

pub async fn handle(device: &Device, args: FactsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let facts = if args.refresh {
        device.refresh_facts().await?
    } else {
        device.facts().await?
    };
    let out = output::render_single(&global.output, facts.as_ref(), detail, |f| f.fqdn.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
