// ── Fact collection ──
//
// Runs the fixed battery of ubus calls and shell one-shots once per
// connection and memoizes the assembled `Facts` behind an atomic
// pointer. `system info` and `system board` are primary: if either
// fails the collection fails. Every other section is best-effort and
// leaves its fields empty, logging a warning.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Map;
use tracing::{debug, info, warn};

use super::Device;
use crate::error::CoreError;
use crate::model::{
    BoardInfo, Facts, FlashLayout, FlashPartition, InterfaceDump, NetworkDevices, SystemInfo,
};

const OS_FAMILY: &str = "openwrt";
const MTD_PATH: &str = "/proc/mtd";

impl Device {
    /// The device's fact set, collected on first use and cached until
    /// [`refresh_facts()`](Self::refresh_facts) or disconnect.
    pub async fn facts(&self) -> Result<Arc<Facts>, CoreError> {
        if let Some(facts) = self.inner.facts.load_full() {
            return Ok(facts);
        }
        let facts = Arc::new(self.collect_facts().await?);
        self.inner.facts.store(Some(Arc::clone(&facts)));
        Ok(facts)
    }

    /// Collect a fresh fact set and swap it in whole.
    ///
    /// Readers keep seeing the previous snapshot until collection finishes.
    /// A failed refresh empties the cache so the next [`facts()`](Self::facts)
    /// collects again.
    pub async fn refresh_facts(&self) -> Result<Arc<Facts>, CoreError> {
        match self.collect_facts().await {
            Ok(facts) => {
                let facts = Arc::new(facts);
                self.inner.facts.store(Some(Arc::clone(&facts)));
                Ok(facts)
            }
            Err(e) => {
                self.inner.facts.store(None);
                Err(e)
            }
        }
    }

    async fn collect_facts(&self) -> Result<Facts, CoreError> {
        let system: SystemInfo = self.ubus_decode("system", "info").await?;
        let board: BoardInfo = self.ubus_decode("system", "board").await?;

        let mut facts = Facts {
            os_family: OS_FAMILY.into(),
            ..Facts::default()
        };
        apply_system(&mut facts, &system);
        apply_board(&mut facts, &board);

        facts.cpuarch = self.best_effort_shell("uname -m").await;
        facts.kernel = self.best_effort_shell("uname -s").await;
        facts.kernelversion = self.best_effort_shell("uname -v").await;

        match self
            .ubus_decode::<NetworkDevices>("network.device", "status")
            .await
        {
            Ok(devices) => facts.hwaddr_interfaces = hardware_addresses(&devices),
            Err(e) => warn!(error = %e, "network device status unavailable"),
        }

        match self
            .ubus_decode::<InterfaceDump>("network.interface", "dump")
            .await
        {
            Ok(dump) => apply_interfaces(&mut facts, &dump),
            Err(e) => warn!(error = %e, "network interface dump unavailable"),
        }

        match self.shell("opkg print-architecture").await {
            Ok(text) => facts.osarch = parse_osarch(&text),
            Err(e) => warn!(error = %e, "package architectures unavailable"),
        }

        match self.file_content(MTD_PATH).await {
            Ok(text) => facts.flash = parse_mtd(&text),
            Err(e) => warn!(error = %e, "flash layout unavailable"),
        }

        info!(
            hostname = %facts.fqdn,
            model = %board.model,
            release = %facts.osrelease,
            "facts collected"
        );
        Ok(facts)
    }

    /// ubus call with no arguments, decoded into `T`.
    async fn ubus_decode<T: DeserializeOwned>(
        &self,
        path: &str,
        method: &str,
    ) -> Result<T, CoreError> {
        let decode_error = |message: String| CoreError::Decode {
            what: format!("{path} {method} reply"),
            message,
        };
        let value = self
            .ubus(path, method, &Map::new())
            .await?
            .into_json()
            .ok_or_else(|| decode_error("empty reply".into()))?;
        serde_json::from_value(value).map_err(|e| decode_error(e.to_string()))
    }

    async fn best_effort_shell(&self, command: &str) -> Option<String> {
        match self.shell(command).await {
            Ok(output) => Some(output.trim().to_string()),
            Err(e) => {
                warn!(command, error = %e, "fact one-shot failed");
                None
            }
        }
    }
}

// ── Derivations ──────────────────────────────────────────────────────

fn apply_system(facts: &mut Facts, system: &SystemInfo) {
    facts.mem_total = system.memory.total / 1024 / 1024;
    facts.swap_total = system.swap.total / 1024 / 1024;
}

fn apply_board(facts: &mut Facts, board: &BoardInfo) {
    facts.cpumodel.clone_from(&board.system);
    facts.kernelrelease.clone_from(&board.kernel);
    facts.fqdn.clone_from(&board.hostname);

    let (manufacturer, productname) = split_model(&board.model);
    facts.manufacturer = manufacturer;
    facts.productname = productname;

    let release = &board.release;
    facts.os.clone_from(&release.distribution);
    facts.osfullname.clone_from(&release.description);
    facts.osrelease.clone_from(&release.version);
    facts.osrelease_info = release.version.split('.').map(str::to_string).collect();
    facts.osmajorrelease = facts.osrelease_info.first().cloned().unwrap_or_default();
    facts.osfinger = format!("{}-{}", facts.os, facts.osmajorrelease);
}

/// Vendor and product from a board model string, split on the first space.
fn split_model(model: &str) -> (String, String) {
    match model.split_once(' ') {
        Some((vendor, product)) => (vendor.to_string(), product.to_string()),
        None => (model.to_string(), String::new()),
    }
}

fn hardware_addresses(devices: &NetworkDevices) -> BTreeMap<String, String> {
    devices
        .iter()
        .filter_map(|(name, dev)| dev.macaddr.clone().map(|mac| (name.clone(), mac)))
        .collect()
}

fn apply_interfaces(facts: &mut Facts, dump: &InterfaceDump) {
    for iface in &dump.interface {
        if let Some(device) = &iface.device {
            if let Some(addrs) = &iface.ipv4_address {
                facts
                    .ip4_interfaces
                    .entry(device.clone())
                    .or_default()
                    .extend(addrs.iter().map(|a| a.address.clone()));
            }
            if let Some(addrs) = &iface.ipv6_address {
                facts
                    .ip6_interfaces
                    .entry(device.clone())
                    .or_default()
                    .extend(addrs.iter().map(|a| a.address.clone()));
            }
        }

        facts.dns.nameservers.extend(iface.dns_server.iter().cloned());
        facts.dns.search.extend(iface.dns_search.iter().cloned());

        for route in &iface.route {
            let v6_default =
                route.target == "::/0" || (route.target == "::" && route.mask == Some(0));
            if route.target == "0.0.0.0" {
                facts.ip_gw = true;
                facts.ip4_gw.clone_from(&route.nexthop);
            } else if v6_default {
                facts.ipv6_gw = true;
                facts.ip6_gw.clone_from(&route.nexthop);
            }
        }
    }
}

// ── Text parsers ─────────────────────────────────────────────────────

/// Architectures from `opkg print-architecture`, highest priority first.
///
/// Lines look like `arch mipsel_24kc 10`. Equal priorities keep listing
/// order; a repeated architecture keeps its last priority. Malformed
/// lines are skipped.
pub fn parse_osarch(text: &str) -> Vec<String> {
    let mut priorities: IndexMap<String, i64> = IndexMap::new();
    for line in text.lines().filter(|l| l.starts_with("arch")) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [_, arch, priority] = tokens.as_slice() else {
            warn!(line, "skipping malformed architecture line");
            continue;
        };
        match priority.parse::<i64>() {
            Ok(priority) => {
                priorities.insert((*arch).to_string(), priority);
            }
            Err(_) => warn!(line, "skipping architecture line with non-numeric priority"),
        }
    }

    let mut ranked: Vec<(String, i64)> = priorities.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(arch, _)| arch).collect()
}

/// Flash layout from `/proc/mtd`.
///
/// The first line is the `dev: size erasesize name` header. Returns `None`
/// when the header is missing, when there are no partitions, or when any
/// partition line is malformed.
pub fn parse_mtd(text: &str) -> Option<FlashLayout> {
    let mut lines = text.lines();
    if !lines.next().is_some_and(|header| header.starts_with("dev:")) {
        debug!("no mtd header, skipping flash layout");
        return None;
    }

    let mut layout = FlashLayout::default();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [dev, size, _erasesize, name] = tokens.as_slice() else {
            debug!(line, "malformed mtd line, skipping flash layout");
            return None;
        };
        let Ok(size) = u64::from_str_radix(*size, 16) else {
            debug!(line, "non-hex mtd size, skipping flash layout");
            return None;
        };
        let dev = dev.strip_suffix(':').unwrap_or(*dev);
        layout.total_size += size;
        layout.partitions.insert(
            dev.to_string(),
            FlashPartition {
                name: name.trim_matches('"').to_string(),
                size,
            },
        );
    }

    if layout.partitions.is_empty() {
        None
    } else {
        Some(layout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    // ── osarch ──

    #[test]
    fn osarch_orders_by_descending_priority() {
        let text = "arch all 1\narch noarch 1\narch mipsel_24kc 10\n";
        assert_eq!(parse_osarch(text), vec!["mipsel_24kc", "all", "noarch"]);
    }

    #[test]
    fn osarch_skips_malformed_lines() {
        let text = "arch all 1\narch broken\narch x86_64 ten\nsomething else\narch x86_64 10\n";
        assert_eq!(parse_osarch(text), vec!["x86_64", "all"]);
    }

    #[test]
    fn osarch_repeated_arch_keeps_last_priority() {
        let text = "arch all 100\narch noarch 50\narch all 1\n";
        assert_eq!(parse_osarch(text), vec!["noarch", "all"]);
    }

    // ── mtd ──

    #[test]
    fn mtd_single_partition() {
        let layout =
            parse_mtd("dev: size erasesize name\nmtd0: 00020000 00010000 \"u-boot\"\n").unwrap();
        assert_eq!(layout.total_size, 0x20000);
        assert_eq!(
            layout.partitions["mtd0"],
            FlashPartition {
                name: "u-boot".into(),
                size: 0x20000,
            }
        );
    }

    #[test]
    fn mtd_sums_partitions() {
        let text = "dev:    size   erasesize  name\n\
                    mtd0: 00040000 00010000 \"u-boot\"\n\
                    mtd1: 00010000 00010000 \"art\"\n\
                    mtd2: 00fb0000 00010000 \"firmware\"\n";
        let layout = parse_mtd(text).unwrap();
        assert_eq!(layout.partitions.len(), 3);
        assert_eq!(layout.total_size, 0x40000 + 0x10000 + 0xfb0000);
        assert_eq!(layout.partitions["mtd2"].name, "firmware");
    }

    #[test]
    fn mtd_malformed_line_drops_the_section() {
        let text = "dev: size erasesize name\nmtd0: 00020000 00010000 \"u-boot\"\nmtd1: zz 00010000 \"x\"\n";
        assert_eq!(parse_mtd(text), None);
        let text = "dev: size erasesize name\nmtd0: 00020000 \"u-boot\"\n";
        assert_eq!(parse_mtd(text), None);
    }

    #[test]
    fn mtd_without_partitions_is_absent() {
        assert_eq!(parse_mtd("dev: size erasesize name\n"), None);
        assert_eq!(parse_mtd("cat: can't open '/proc/mtd': No such file or directory"), None);
        assert_eq!(parse_mtd(""), None);
    }

    // ── board / system ──

    #[test]
    fn model_splits_on_first_space() {
        assert_eq!(
            split_model("TP-Link Archer C7 v5"),
            ("TP-Link".to_string(), "Archer C7 v5".to_string())
        );
        assert_eq!(split_model("QEMU"), ("QEMU".to_string(), String::new()));
    }

    #[test]
    fn board_fields_derive_os_facts() {
        let board: BoardInfo = serde_json::from_value(json!({
            "kernel": "5.15.134",
            "hostname": "gw",
            "system": "MediaTek MT7621 ver:1 eco:3",
            "model": "Xiaomi Mi Router 4A Gigabit Edition",
            "release": {
                "distribution": "OpenWrt",
                "version": "23.05.0",
                "revision": "r23497-6637af95aa",
                "description": "OpenWrt 23.05.0 r23497-6637af95aa"
            }
        }))
        .unwrap();
        let mut facts = Facts::default();
        apply_board(&mut facts, &board);

        assert_eq!(facts.manufacturer, "Xiaomi");
        assert_eq!(facts.productname, "Mi Router 4A Gigabit Edition");
        assert_eq!(facts.osmajorrelease, "23");
        assert_eq!(facts.osrelease_info, vec!["23", "05", "0"]);
        assert_eq!(facts.osfinger, "OpenWrt-23");
        assert_eq!(facts.cpumodel, "MediaTek MT7621 ver:1 eco:3");
        assert_eq!(facts.kernelrelease, "5.15.134");
    }

    #[test]
    fn memory_is_reported_in_mebibytes() {
        let system: SystemInfo = serde_json::from_value(json!({
            "memory": { "total": 128_974_848_u64, "free": 80_000_000_u64 },
            "swap": { "total": 0, "free": 0 }
        }))
        .unwrap();
        let mut facts = Facts::default();
        apply_system(&mut facts, &system);
        assert_eq!(facts.mem_total, 123);
        assert_eq!(facts.swap_total, 0);
    }

    // ── network ──

    #[test]
    fn interfaces_merge_addresses_and_find_gateways() {
        let dump: InterfaceDump = serde_json::from_value(json!({
            "interface": [
                {
                    "interface": "lan",
                    "device": "br-lan",
                    "ipv4-address": [{ "address": "192.168.1.1", "mask": 24 }],
                    "ipv6-address": [],
                    "route": [],
                    "dns-server": [],
                    "dns-search": ["lan"]
                },
                {
                    "interface": "wan",
                    "device": "eth1",
                    "ipv4-address": [{ "address": "203.0.113.7", "mask": 24 }],
                    "route": [{ "target": "0.0.0.0", "mask": 0, "nexthop": "203.0.113.1" }],
                    "dns-server": ["1.1.1.1", "9.9.9.9"]
                },
                {
                    "interface": "wan6",
                    "device": "eth1",
                    "ipv6-address": [{ "address": "2001:db8::7", "mask": 64 }],
                    "route": [{ "target": "::", "mask": 0, "nexthop": "fe80::1" }]
                },
                { "interface": "vpn", "dns-server": ["10.8.0.1"] }
            ]
        }))
        .unwrap();
        let mut facts = Facts::default();
        apply_interfaces(&mut facts, &dump);

        assert_eq!(facts.ip4_interfaces["br-lan"], vec!["192.168.1.1"]);
        assert_eq!(facts.ip4_interfaces["eth1"], vec!["203.0.113.7"]);
        assert_eq!(facts.ip6_interfaces["eth1"], vec!["2001:db8::7"]);
        assert!(facts.ip6_interfaces["br-lan"].is_empty());
        assert_eq!(facts.ip4_interfaces.len(), 2);

        assert!(facts.ip_gw);
        assert_eq!(facts.ip4_gw.as_deref(), Some("203.0.113.1"));
        assert!(facts.ipv6_gw);
        assert_eq!(facts.ip6_gw.as_deref(), Some("fe80::1"));

        assert_eq!(facts.dns.nameservers, vec!["1.1.1.1", "9.9.9.9", "10.8.0.1"]);
        assert_eq!(facts.dns.search, vec!["lan"]);
        assert!(facts.dns.domain.is_empty());
    }

    #[test]
    fn no_default_route_leaves_gateway_flags_false() {
        let dump: InterfaceDump = serde_json::from_value(json!({
            "interface": [{ "interface": "lan", "device": "br-lan",
                            "route": [{ "target": "10.0.0.0", "mask": 8, "nexthop": "192.168.1.2" }] }]
        }))
        .unwrap();
        let mut facts = Facts::default();
        apply_interfaces(&mut facts, &dump);
        assert!(!facts.ip_gw);
        assert!(!facts.ipv6_gw);
        assert_eq!(facts.ip4_gw, None);
    }

    #[test]
    fn devices_without_mac_are_skipped() {
        let devices: NetworkDevices = serde_json::from_value(json!({
            "eth0": { "macaddr": "aa:bb:cc:dd:ee:ff", "up": true },
            "tun0": { "up": true }
        }))
        .unwrap();
        let macs = hardware_addresses(&devices);
        assert_eq!(macs.len(), 1);
        assert_eq!(macs["eth0"], "aa:bb:cc:dd:ee:ff");
    }
}
