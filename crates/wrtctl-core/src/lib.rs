//! Device facade and management operations for OpenWRT routers.
//!
//! This crate owns the business logic between the `wrtctl-api` shell
//! channel and the CLI:
//!
//! - **[`Device`]**: cheaply cloneable facade over one serialized SSH
//!   session. [`connect()`](Device::connect) opens and probes it,
//!   [`Device::oneshot()`] wraps a single CLI invocation.
//!
//! - **Operations**: package management (`opkg`), network service
//!   control and interface status (`ubus`), UCI get/set/dump/reload,
//!   arbitrary commands, and reboot, all as `impl Device` methods
//!   returning [`CoreError`] on failure.
//!
//! - **Facts** ([`Device::facts`]): hardware, OS, and network attributes
//!   collected once per connection and swapped atomically on
//!   [`refresh_facts()`](Device::refresh_facts).
//!
//! - **State** ([`state::config_set`]): idempotent UCI reconciliation
//!   that reports succeeded / failed / pending records.

pub mod config;
pub mod device;
pub mod error;
pub mod model;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::DeviceConfig;
pub use device::Device;
pub use error::CoreError;
pub use state::{Outcome, StateResult};

pub use model::{Dns, Facts, FlashLayout, FlashPartition, RunResult};

// Channel-level types that appear in this crate's public API.
pub use wrtctl_api::{CommandOutput, Connector, HostKeyPolicy, Transcript, Transport, UbusReply};
