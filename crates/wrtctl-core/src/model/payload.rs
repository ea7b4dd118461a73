// ── ubus payloads ──
//
// Typed views of the JSON documents returned by the four ubus calls the
// fact collector makes. Only fields that feed a fact are declared; serde
// ignores the rest. Required fields fail decoding when missing, optional
// ones default.

use std::collections::BTreeMap;

use serde::Deserialize;

// ── system info ──────────────────────────────────────────────────────

/// `ubus call system info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    pub memory: MemoryInfo,
    /// Images built without swap support omit this object.
    #[serde(default)]
    pub swap: MemoryInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryInfo {
    /// Bytes.
    pub total: u64,
}

// ── system board ─────────────────────────────────────────────────────

/// `ubus call system board`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardInfo {
    pub hostname: String,
    /// Vendor and product, e.g. `"Linksys WRT3200ACM"`.
    pub model: String,
    /// CPU description.
    pub system: String,
    /// Kernel release.
    pub kernel: String,
    pub release: ReleaseInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub distribution: String,
    pub version: String,
    pub description: String,
}

// ── network.device status ────────────────────────────────────────────

/// One entry of `ubus call network.device status`, keyed by device name.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDevice {
    /// Tunnels and some virtual devices have no hardware address.
    #[serde(default)]
    pub macaddr: Option<String>,
}

pub type NetworkDevices = BTreeMap<String, NetworkDevice>;

// ── network.interface dump ───────────────────────────────────────────

/// `ubus call network.interface dump`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceDump {
    #[serde(default)]
    pub interface: Vec<InterfaceStatus>,
}

/// One logical interface (`lan`, `wan`, `wan6`, ...).
///
/// Address lists are `None` when the key is absent, which is not the same
/// as an interface that reports no addresses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceStatus {
    /// Bound layer-3 device; absent while the interface is down.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub ipv4_address: Option<Vec<AddressEntry>>,
    #[serde(default)]
    pub ipv6_address: Option<Vec<AddressEntry>>,
    #[serde(default)]
    pub dns_server: Vec<String>,
    #[serde(default)]
    pub dns_search: Vec<String>,
    #[serde(default)]
    pub route: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressEntry {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub target: String,
    /// Prefix length; `::` with mask 0 is the IPv6 default route.
    #[serde(default)]
    pub mask: Option<u8>,
    #[serde(default)]
    pub nexthop: Option<String>,
}
