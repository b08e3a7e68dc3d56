//! `intercom` operator binary.
//!
//! # Usage
//!
//! ```bash
//! # Register a resident and a three-visit pass
//! intercom resident add --name "Ana Souza" --unit 204 --passcode 1234
//! intercom visitor add --name "Carlos Lima" --unit 204 --passcode 4521 --multiple --usage-limit 3
//!
//! # Try a credential, then look at the day's activity
//! intercom check --unit 204 --passcode 4521
//! intercom --json report --since-hours 24
//!
//! # Point at another database through the environment
//! INTERCOM_DATABASE=/var/lib/intercom/kiosk.db intercom kiosk
//! ```

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, LogFormat};
use commands::Output;
use intercom_storage::{Database, DatabaseConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = DatabaseConfig::new(&cli.database);
    let db = Database::open(&config)
        .await
        .with_context(|| format!("failed to open database {}", cli.database.display()))?;

    let out = Output { json: cli.json };
    let result = match cli.command {
        Command::Resident { command } => commands::resident(&db, out, command).await,
        Command::Visitor { command } => commands::visitor(&db, out, command).await,
        Command::Check { unit, passcode } => commands::check(&db, out, &unit, &passcode).await,
        Command::Report { since_hours } => commands::report(&db, out, since_hours).await,
        Command::Archive { older_than_days } => commands::archive(&db, out, older_than_days).await,
        Command::Kiosk { feedback_ms } => commands::kiosk(&db, feedback_ms).await,
    };

    db.close().await;
    result
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
