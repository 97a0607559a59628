//! Clap derive structures for the `fabwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fabwatch -- live alert console for industrial digital modules
#[derive(Debug, Parser)]
#[command(
    name = "fabwatch",
    version,
    about = "Monitor industrial digital module alerts from the command line",
    long_about = "A console for the plant gateway's alert feeds.\n\n\
        Streams live alerts over the push channel, manages sensor\n\
        thresholds, and queries the historical alert log.",
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
    /// Gateway URL (overrides the config file)
    #[arg(long, short = 'g', env = "FABWATCH_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FABWATCH_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FABWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// HTTP timeout in seconds
    #[arg(long, env = "FABWATCH_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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
    /// Stream live alerts from the push channel
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Inspect the sensor catalog and manage thresholds
    #[command(alias = "sen")]
    Sensors(SensorsArgs),

    /// Query the historical alert log
    #[command(alias = "al")]
    Alerts(AlertsArgs),

    /// List the digital module fleet
    #[command(alias = "mod")]
    Modules,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this long (e.g. "30s", "5m"); runs until Ctrl-C when unset
    #[arg(long = "for", value_name = "DURATION")]
    pub duration: Option<String>,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorsCommand {
    /// List the sensor catalog with current thresholds
    List {
        /// Catalog page to show
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Persist new thresholds for one sensor
    SetThresholds {
        /// Sensor identifier, e.g. drill_temp1
        sensor_id: String,

        /// New minimum threshold
        #[arg(long)]
        min: String,

        /// New maximum threshold
        #[arg(long)]
        max: String,
    },
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Fetch alerts matching the filter criteria
    Query {
        /// Only alerts for this sensor
        #[arg(long)]
        sensor: Option<String>,

        /// Only alerts for this module (e.g. DRILL001)
        #[arg(long)]
        module: Option<String>,

        /// Only alerts with this status (firing / resolved)
        #[arg(long)]
        status: Option<String>,

        /// Only alerts starting at or after this local time
        #[arg(long)]
        from: Option<String>,

        /// Only alerts starting at or before this local time
        #[arg(long)]
        to: Option<String>,

        /// Result page to show
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration as TOML
    Show,

    /// Write a starter config file
    Init,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
