// ── Device facts ──
//
// The snapshot assembled once per connection by the fact collector.
// Replaced wholesale on refresh, never mutated in place.

use std::collections::BTreeMap;

use serde::Serialize;

/// Static and semi-static attributes of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    // ── Hardware ─────────────────────────────────────────────────────
    /// Physical memory in MiB.
    pub mem_total: u64,
    /// Swap in MiB.
    pub swap_total: u64,
    /// `uname -m`.
    pub cpuarch: Option<String>,
    pub cpumodel: String,
    pub manufacturer: String,
    pub productname: String,

    // ── Kernel and OS ────────────────────────────────────────────────
    /// `uname -s`.
    pub kernel: Option<String>,
    pub kernelrelease: String,
    /// `uname -v`.
    pub kernelversion: Option<String>,
    pub fqdn: String,
    pub os: String,
    pub os_family: String,
    pub osfullname: String,
    pub osrelease: String,
    pub osmajorrelease: String,
    pub osrelease_info: Vec<String>,
    pub osfinger: String,
    /// Package architectures, highest priority first.
    pub osarch: Vec<String>,

    // ── Network ──────────────────────────────────────────────────────
    pub ip_gw: bool,
    pub ipv6_gw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip4_gw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip6_gw: Option<String>,
    pub dns: Dns,
    pub hwaddr_interfaces: BTreeMap<String, String>,
    pub ip4_interfaces: BTreeMap<String, Vec<String>>,
    pub ip6_interfaces: BTreeMap<String, Vec<String>>,

    // ── Storage ──────────────────────────────────────────────────────
    /// Absent when `/proc/mtd` is missing or unparseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashLayout>,
}

/// Resolver settings gathered across all interfaces.
///
/// Only `nameservers` and `search` are populated; the remaining lists keep
/// the conventional resolver shape so consumers can rely on every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dns {
    pub domain: Vec<String>,
    pub ip4_nameservers: Vec<String>,
    pub ip6_nameservers: Vec<String>,
    pub nameservers: Vec<String>,
    pub options: Vec<String>,
    pub search: Vec<String>,
    pub sortlist: Vec<String>,
}

/// MTD flash partition table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlashLayout {
    /// Keyed by MTD device id (`mtd0`, `mtd1`, ...).
    pub partitions: BTreeMap<String, FlashPartition>,
    /// Sum of all partition sizes, in bytes.
    pub total_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashPartition {
    pub name: String,
    /// Bytes.
    pub size: u64,
}
