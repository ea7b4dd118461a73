// wrtctl-api: serialized remote-shell channel and ubus bridge for OpenWRT devices

pub mod error;
pub mod framing;
pub mod session;
pub mod ssh;
pub mod transport;
pub mod ubus;

pub use error::Error;
pub use session::{CommandOutput, RetryPolicy, Session};
pub use ssh::{DEFAULT_PROMPT, HostKeyPolicy, SshConfig, SshConnector};
pub use transport::{Connector, Transcript, Transport};
pub use ubus::{UbusReply, shell_quote, shell_word};
