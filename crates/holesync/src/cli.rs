//! Clap derive structures for the `holesync` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// holesync -- mirror Pi-hole lists and groups as local switch devices
#[derive(Debug, Parser)]
#[command(
    name = "holesync",
    version,
    about = "Mirror Pi-hole lists and groups as local on/off devices",
    long_about = "Keeps a local device store in sync with a Pi-hole v6 appliance.\n\n\
        Every adlist and client group becomes a switch device; statistics\n\
        become counters. Switching a device forwards the change to Pi-hole.",
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
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "HOLESYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Pi-hole URL (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub url: Option<String>,

    /// Device store file (overrides config)
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwitchArg {
    On,
    Off,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the sync loop, reading "<slot> <On|Off> [level]" commands from stdin
    Run(RunArgs),

    /// Run one startup pass (sync + refresh) and exit
    Sync,

    /// List devices in the local store
    #[command(alias = "dev", alias = "ls")]
    Devices(DevicesArgs),

    /// Switch the Pi-hole entity behind a slot on or off
    Set(SetArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Heartbeat interval in seconds (overrides config)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Do not read commands from stdin
    #[arg(long)]
    pub no_stdin: bool,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only show devices of this kind
    #[arg(long)]
    pub kind: Option<DeviceKindArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceKindArg {
    Stats,
    List,
    Group,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Device slot number
    pub slot: u32,

    /// Desired state
    pub state: SwitchArg,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (password masked)
    Show,
    /// Print the config file path
    Path,
    /// Interactive setup wizard
    Init,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
