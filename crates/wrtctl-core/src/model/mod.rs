// ── Domain model ──
//
// Canonical shapes the CLI renders: the fact set, the command result
// record, and the decoded ubus payloads the fact collector walks.

pub mod facts;
pub mod payload;
pub mod run;

// ── Re-exports ──────────────────────────────────────────────────────

pub use facts::{Dns, Facts, FlashLayout, FlashPartition};
pub use payload::{
    AddressEntry, BoardInfo, InterfaceDump, InterfaceStatus, MemoryInfo, NetworkDevice,
    NetworkDevices, ReleaseInfo, Route, SystemInfo,
};
pub use run::RunResult;
