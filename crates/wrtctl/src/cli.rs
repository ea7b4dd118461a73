//! Clap derive structures for the `wrtctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wrtctl -- manage OpenWRT devices over SSH and ubus
#[derive(Debug, Parser)]
#[command(
    name = "wrtctl",
    version,
    about = "Manage OpenWRT devices from the command line",
    long_about = "Drives an OpenWRT device through an interactive SSH shell.\n\n\
        Collects device facts, manages opkg packages, network services and\n\
        UCI settings, and calls ubus methods, without any agent on the device.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "WRTCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device hostname or address (overrides profile)
    #[arg(long, short = 'H', env = "WRTCTL_HOST", global = true)]
    pub host: Option<String>,

    /// Login user (overrides profile)
    #[arg(long, short = 'u', env = "WRTCTL_USER", global = true)]
    pub user: Option<String>,

    /// SSH port (overrides profile)
    #[arg(long, env = "WRTCTL_PORT", global = true)]
    pub port: Option<u16>,

    /// Accept any host key instead of checking known_hosts
    #[arg(long, env = "WRTCTL_ACCEPT_HOST_KEY", global = true)]
    pub accept_host_key: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WRTCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Per-command timeout in seconds (overrides profile)
    #[arg(long, env = "WRTCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the device answers on its shell
    Ping,

    /// Show the device fact set
    #[command(alias = "f")]
    Facts(FactsArgs),

    /// Manage opkg packages
    #[command(alias = "pkg")]
    Packages(PackagesArgs),

    /// Manage network services and inspect interfaces
    #[command(alias = "net", alias = "n")]
    Network(NetworkArgs),

    /// Read and write UCI settings
    Uci(UciArgs),

    /// Run a shell command on the device
    Run(RunArgs),

    /// Reboot the device
    Reboot,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FACTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FactsArgs {
    /// Ignore the cached fact set and collect again
    #[arg(long)]
    pub refresh: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PACKAGES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PackagesArgs {
    #[command(subcommand)]
    pub command: PackagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PackagesCommand {
    /// Refresh the package index
    Update,

    /// List installed packages
    #[command(alias = "ls")]
    List,

    /// Remove an installed package
    #[command(alias = "rm")]
    Remove {
        /// Package name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NETWORK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Restart the network service
    Restart,

    /// Reload the network configuration
    Reload,

    /// List logical interfaces registered on ubus
    #[command(alias = "ls")]
    Interfaces,

    /// Show the status of a network device
    Device {
        /// Device name (e.g. br-lan, eth0)
        name: String,
    },

    /// Show the status of a logical interface
    Interface {
        /// Interface name (e.g. lan, wan)
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  UCI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UciArgs {
    #[command(subcommand)]
    pub command: UciCommand,
}

#[derive(Debug, Subcommand)]
pub enum UciCommand {
    /// Dump every UCI setting
    Dump,

    /// Read one key
    Get {
        /// Key (e.g. system.@system[0].hostname)
        key: String,
    },

    /// Set and commit one key
    Set {
        /// Key (e.g. system.@system[0].hostname)
        key: String,

        /// New value
        value: String,
    },

    /// Set a key only if it differs, reporting what changed
    Ensure {
        /// Key (e.g. system.@system[0].hostname)
        key: String,

        /// Desired value
        value: String,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply committed configuration to running services
    Reload,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Command line, passed to the device shell as one string
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
