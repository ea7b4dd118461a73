// Shared test helpers: an in-memory OpenWRT shell behind the `Connector` seam.
#![allow(clippy::unwrap_used, dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use wrtctl_api::{Connector, Error, Transcript, Transport};
use wrtctl_core::{Device, DeviceConfig};

const PROMPT: &str = "root@OpenWrt:~# ";
const CHECK_SUFFIX: &str = "; echo $?";

/// Scripted device. Commands not in the script behave like a missing binary.
#[derive(Clone, Default)]
pub struct FakeRouter {
    replies: Arc<Mutex<HashMap<String, (String, i32)>>>,
    log: Arc<Mutex<Vec<String>>>,
    opens: Arc<AtomicU32>,
    refuse: Arc<AtomicU32>,
    gate: Arc<Mutex<Option<(String, Arc<Notify>)>>>,
}

impl FakeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a reply: `output` on stdout and exit status `rc`.
    pub fn reply(self, command: &str, output: &str, rc: i32) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), (output.to_string(), rc));
        self
    }

    /// Refuse the next `n` connection attempts.
    pub fn refuse_connections(self, n: u32) -> Self {
        self.refuse.store(n, Ordering::SeqCst);
        self
    }

    /// Hold `command` at the shell until the returned handle is notified.
    pub fn hold(&self, command: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((command.to_string(), Arc::clone(&notify)));
        notify
    }

    /// Commands received, without probes and with the status suffix removed.
    pub fn commands(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.as_str() != "echo 1234")
            .map(|line| line.strip_suffix(CHECK_SUFFIX).unwrap_or(line.as_str()).to_string())
            .collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn device(&self) -> Device {
        let config = DeviceConfig {
            host: "fake".into(),
            retry_backoff: Duration::ZERO,
            ..DeviceConfig::default()
        };
        Device::with_connector(config, Arc::new(self.clone()))
    }

    fn answer(&self, line: &str) -> String {
        if line == "echo 1234" {
            return "1234".into();
        }
        let replies = self.replies.lock().unwrap();
        match line.strip_suffix(CHECK_SUFFIX) {
            Some(command) => {
                let (out, rc) = replies
                    .get(command)
                    .cloned()
                    .unwrap_or_else(|| (format!("-ash: {command}: not found"), 127));
                if out.is_empty() {
                    rc.to_string()
                } else {
                    format!("{out}\n{rc}")
                }
            }
            None => replies
                .get(line)
                .map(|(out, _)| out.clone())
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Connector for FakeRouter {
    async fn open(&self) -> Result<Box<dyn Transport>, Error> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(Error::Connect {
                host: "fake".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(Box::new(FakeShell {
            router: self.clone(),
        }))
    }

    fn target(&self) -> String {
        "root@fake:22".into()
    }
}

struct FakeShell {
    router: FakeRouter,
}

#[async_trait]
impl Transport for FakeShell {
    async fn send_line(&mut self, line: &str) -> Result<Transcript, Error> {
        self.router.log.lock().unwrap().push(line.to_string());
        let held = {
            let gate = self.router.gate.lock().unwrap();
            gate.as_ref()
                .filter(|(command, _)| line.strip_suffix(CHECK_SUFFIX) == Some(command.as_str()))
                .map(|(_, notify)| Arc::clone(notify))
        };
        if let Some(notify) = held {
            notify.notified().await;
        }
        let output = self.router.answer(line);
        let stdout = if output.is_empty() {
            format!("{line}\r\n{PROMPT}")
        } else {
            format!("{line}\r\n{}\r\n{PROMPT}", output.replace('\n', "\r\n"))
        };
        Ok(Transcript {
            stdout,
            stderr: String::new(),
        })
    }

    async fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub const SYSTEM_INFO: &str = r#"{"localtime":1700000000,"uptime":3600,"load":[0,0,0],"memory":{"total":268435456,"free":200000000,"shared":1000,"buffered":0,"available":210000000,"cached":30000000},"swap":{"total":0,"free":0}}"#;

pub const SYSTEM_BOARD: &str = r#"{"kernel":"5.15.134","hostname":"gw","system":"MediaTek MT7621 ver:1 eco:3","model":"Xiaomi Mi Router 4A Gigabit Edition","board_name":"xiaomi,mi-router-4a-gigabit","rootfs_type":"squashfs","release":{"distribution":"OpenWrt","version":"23.05.0","revision":"r23497-6637af95aa","target":"ramips/mt7621","description":"OpenWrt 23.05.0 r23497-6637af95aa"}}"#;

pub const NETWORK_DEVICES: &str = r#"{"br-lan":{"up":true,"macaddr":"64:64:4a:00:00:01"},"wan":{"up":true,"macaddr":"64:64:4a:00:00:02"}}"#;

pub const INTERFACE_DUMP: &str = r#"{"interface":[{"interface":"lan","up":true,"device":"br-lan","ipv4-address":[{"address":"192.168.31.1","mask":24}],"ipv6-address":[],"route":[],"dns-server":[],"dns-search":[]},{"interface":"wan","up":true,"device":"wan","ipv4-address":[{"address":"198.51.100.20","mask":24}],"route":[{"target":"0.0.0.0","mask":0,"nexthop":"198.51.100.1"}],"dns-server":["198.51.100.1"],"dns-search":[]}]}"#;

pub const MTD: &str = "dev:    size   erasesize  name\nmtd0: 00030000 00010000 \"Bootloader\"\nmtd1: 00010000 00010000 \"Config\"\nmtd2: 00fb0000 00010000 \"firmware\"";

/// A device that answers every fact query.
pub fn router_with_facts() -> FakeRouter {
    FakeRouter::new()
        .reply("ubus call system info '{}'", SYSTEM_INFO, 0)
        .reply("ubus call system board '{}'", SYSTEM_BOARD, 0)
        .reply("ubus call network.device status '{}'", NETWORK_DEVICES, 0)
        .reply("ubus call network.interface dump '{}'", INTERFACE_DUMP, 0)
        .reply("uname -m", "mips", 0)
        .reply("uname -s", "Linux", 0)
        .reply("uname -v", "#0 SMP Mon Oct 9 21:45:57 2023", 0)
        .reply(
            "opkg print-architecture",
            "arch all 1\narch noarch 1\narch mipsel_24kc 10",
            0,
        )
        .reply("cat /proc/mtd", MTD, 0)
}
