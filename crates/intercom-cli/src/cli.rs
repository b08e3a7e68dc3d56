//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use intercom_core::VisitorStatus;

#[derive(Debug, Parser)]
#[command(name = "intercom", version, about = "Building intercom access management")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "INTERCOM_DATABASE", default_value = "intercom.db")]
    pub database: PathBuf,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage residents
    Resident {
        #[command(subcommand)]
        command: ResidentCommand,
    },
    /// Manage visitor passes
    Visitor {
        #[command(subcommand)]
        command: VisitorCommand,
    },
    /// Validate a unit and passcode as the kiosk would
    Check {
        #[arg(long)]
        unit: String,
        #[arg(long)]
        passcode: String,
    },
    /// Summarize recent kiosk attempts
    Report {
        #[arg(long, default_value_t = 24)]
        since_hours: i64,
    },
    /// Archive departed, denied and expired visitors
    Archive {
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
    },
    /// Run an interactive kiosk reading keypad keys from stdin
    Kiosk {
        /// How long the outcome stays on the panel
        #[arg(long, default_value_t = intercom_core::constants::DEFAULT_FEEDBACK_MS)]
        feedback_ms: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ResidentCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        passcode: String,
    },
    List {
        #[arg(long)]
        unit: Option<String>,
    },
    Remove {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum VisitorCommand {
    Add(VisitorAdd),
    List {
        #[arg(long)]
        unit: Option<String>,
    },
    /// Move a visitor along its lifecycle
    Status {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        status: VisitorStatus,
    },
}

#[derive(Debug, Args)]
pub struct VisitorAdd {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub unit: String,
    #[arg(long)]
    pub passcode: String,
    /// Allow more than one entry
    #[arg(long, default_value_t = false)]
    pub multiple: bool,
    /// Entry cap for a multi-use pass; blank or non-positive means unlimited
    #[arg(long, requires = "multiple")]
    pub usage_limit: Option<String>,
    /// Passcode stops working after this many hours
    #[arg(long)]
    pub expires_in_hours: Option<i64>,
    /// Resident who registered the visitor
    #[arg(long)]
    pub host: Option<i64>,
}
