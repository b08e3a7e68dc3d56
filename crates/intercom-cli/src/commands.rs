//! Subcommand handlers.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Duration as ChronoDuration, Utc};
use intercom_core::{Passcode, UnitNumber, Verdict, parse_usage_limit};
use intercom_kiosk::{DoorCommand, KioskConfig, KioskSession, KioskStep, parse_keys};
use intercom_storage::models::{Resident, Visitor};
use intercom_storage::repositories::{
    ResidentRepository, SqliteAccessLogRepository, SqliteResidentRepository,
    SqliteVisitorRepository, VisitorRepository,
};
use intercom_storage::{AccessReport, Database, StoredValidator};
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cli::{ResidentCommand, VisitorAdd, VisitorCommand};

/// Output switch shared by the handlers
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

pub async fn resident(db: &Database, out: Output, command: ResidentCommand) -> Result<()> {
    let repo = SqliteResidentRepository::new(db.pool().clone());

    match command {
        ResidentCommand::Add {
            name,
            unit,
            passcode,
        } => {
            let unit = UnitNumber::new(&unit)?;
            let passcode = Passcode::new(&passcode)?;
            let id = repo
                .create(&Resident::new(name.trim(), unit.as_str(), passcode.as_str()))
                .await
                .context("failed to create resident")?;
            info!(id, unit = %unit, "resident added");
            out.emit(&json!({ "id": id }), || format!("resident {id} added to unit {unit}"))
        }
        ResidentCommand::List { unit } => {
            let residents = match unit {
                Some(unit) => repo.find_by_unit(&unit).await?,
                None => repo.list().await?,
            };
            out.emit(&residents, || {
                residents
                    .iter()
                    .map(|r| format!("{:>5}  {:<10}  {}", r.id, r.unit_number, r.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        ResidentCommand::Remove { id } => {
            repo.delete(id).await?;
            info!(id, "resident removed");
            out.emit(&json!({ "removed": id }), || format!("resident {id} removed"))
        }
    }
}

pub async fn visitor(db: &Database, out: Output, command: VisitorCommand) -> Result<()> {
    let repo = SqliteVisitorRepository::new(db.pool().clone());

    match command {
        VisitorCommand::Add(add) => {
            let visitor = build_visitor(add)?;
            let id = repo
                .create(&visitor)
                .await
                .context("failed to create visitor")?;
            info!(id, unit = %visitor.unit_number, access_type = %visitor.access_type, "visitor added");
            out.emit(&json!({ "id": id }), || {
                format!("visitor {id} added to unit {}", visitor.unit_number)
            })
        }
        VisitorCommand::List { unit } => {
            let visitors = match unit {
                Some(unit) => repo.find_by_unit(&unit).await?,
                None => repo.list_active().await?,
            };
            out.emit(&visitors, || {
                visitors
                    .iter()
                    .map(|v| {
                        let limit = v
                            .usage_limit
                            .map_or_else(|| "-".to_string(), |l| l.to_string());
                        format!(
                            "{:>5}  {:<10}  {:<9}  {:<8}  {}/{}  {}",
                            v.id, v.unit_number, v.status, v.access_type, v.entry_count, limit, v.name
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        VisitorCommand::Status { id, status } => {
            repo.update_status(id, status).await?;
            info!(id, status = %status, "visitor status changed");
            out.emit(&json!({ "id": id, "status": status }), || {
                format!("visitor {id} is now {status}")
            })
        }
    }
}

fn build_visitor(add: VisitorAdd) -> Result<Visitor> {
    let unit = UnitNumber::new(&add.unit)?;
    let passcode = Passcode::new(&add.passcode)?;
    let mut visitor = Visitor::new(add.name.trim(), unit.as_str(), passcode.as_str());

    if add.multiple {
        let limit = add
            .usage_limit
            .as_deref()
            .and_then(parse_usage_limit)
            .map(i64::from);
        visitor = visitor.multiple(limit);
    }
    if let Some(hours) = add.expires_in_hours {
        if hours <= 0 {
            bail!("--expires-in-hours must be positive");
        }
        visitor = visitor.expires_at(Utc::now() + ChronoDuration::hours(hours));
    }
    if let Some(host) = add.host {
        visitor = visitor.hosted_by(host);
    }
    Ok(visitor)
}

pub async fn check(db: &Database, out: Output, unit: &str, passcode: &str) -> Result<()> {
    let validator = StoredValidator::new(db.pool().clone());
    let verdict = validator.check(unit, passcode).await?;
    let message = verdict.display_message();

    out.emit(&json!({ "result": verdict, "message": message }), || {
        match &verdict {
            Verdict::Granted { subject, .. } => format!("GRANTED ({subject:?}): {message}"),
            Verdict::Denied { reason, .. } => format!("DENIED ({reason}): {message}"),
        }
    })
}

pub async fn report(db: &Database, out: Output, since_hours: i64) -> Result<()> {
    let end = Utc::now();
    let start = end - ChronoDuration::hours(since_hours.max(0));
    let repo = SqliteAccessLogRepository::new(db.pool().clone());
    let report = AccessReport::generate(&repo, start, end).await?;

    out.emit(&report, || {
        let mut lines = vec![
            format!("attempts {} to {}", report.start.to_rfc3339(), report.end.to_rfc3339()),
            format!(
                "total {}  granted {}  denied {}",
                report.total, report.granted, report.denied
            ),
        ];
        lines.extend(
            report
                .denied_by_reason
                .iter()
                .map(|(reason, count)| format!("  {reason:<20} {count}")),
        );
        lines.extend(report.units.iter().map(|u| {
            format!("unit {:<10} granted {:>4}  denied {:>4}", u.unit_number, u.granted, u.denied)
        }));
        lines.join("\n")
    })
}

pub async fn archive(db: &Database, out: Output, older_than_days: i64) -> Result<()> {
    let cutoff = Utc::now() - ChronoDuration::days(older_than_days.max(0));
    let repo = SqliteVisitorRepository::new(db.pool().clone());
    let archived = repo.archive_inactive(cutoff).await?;

    info!(archived, %cutoff, "archived inactive visitors");
    out.emit(&json!({ "archived": archived }), || {
        format!("{archived} visitor(s) archived")
    })
}

/// Interactive kiosk on stdin/stdout.
///
/// Each line is parsed with [`parse_keys`]; the panel is printed after
/// every line.
pub async fn kiosk(db: &Database, feedback_ms: u64) -> Result<()> {
    let validator = StoredValidator::new(db.pool().clone());
    let (door_tx, mut door_rx) = mpsc::channel(8);
    let config = KioskConfig::default().feedback_duration(Duration::from_millis(feedback_ms));
    let mut session = KioskSession::with_config(validator, door_tx, config);

    let door = tokio::spawn(async move {
        while let Some(DoorCommand::Open { unit_number }) = door_rx.recv().await {
            println!(">> door released for unit {unit_number}");
        }
    });

    println!("keys: digits, # enter, * cancel, < backspace, c clear");
    print_panel(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.expire_feedback(Instant::now())?;

        match parse_keys(&line) {
            Ok(keys) => {
                for key in keys {
                    session.press(key).await?;
                }
            }
            Err(e) => warn!(error = %e, "ignoring keypad line"),
        }
        print_panel(&session);
    }

    drop(session);
    door.await?;
    Ok(())
}

fn print_panel<C>(session: &KioskSession<C>)
where
    C: intercom_kiosk::AccessCheck,
{
    let input = match session.step() {
        KioskStep::UnitEntry => session.unit_input().to_string(),
        KioskStep::PasscodeEntry => session.masked_passcode(),
        KioskStep::Processing | KioskStep::Feedback => String::new(),
    };
    println!("[{}] {} {}", session.step(), session.message(), input);
}
