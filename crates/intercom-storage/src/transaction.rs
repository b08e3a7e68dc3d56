//! Transaction-aware operations for the kiosk validation flow.
//!
//! Every function takes an open SQLite transaction so that loading the
//! unit's records, applying the validator's mutation and writing the audit
//! row either all happen or none do.
//!
//! # Usage Pattern
//!
//! ```no_run
//! use intercom_storage::{Database, DatabaseConfig, transaction};
//! use intercom_core::AccessValidator;
//! use chrono::Utc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(&DatabaseConfig::new("intercom.db")).await?;
//! let mut tx = db.pool().begin().await?;
//!
//! let residents = transaction::load_residents_for_unit(&mut tx, "204").await?;
//! let visitors = transaction::load_visitors_for_unit(&mut tx, "204").await?;
//! let verdict = AccessValidator::new().validate_at("204", "4521", &residents, &visitors, Utc::now());
//!
//! tx.commit().await?;
//! # let _ = verdict;
//! # Ok(())
//! # }
//! ```
//!
//! # Atomic Guarantees
//!
//! Dropping the transaction without committing rolls back everything done
//! through it. Never touch the pool while a transaction is open: the
//! in-memory database has a single connection and the call would wait on
//! itself.

use crate::error::StorageResult;
use crate::models::{AccessLog, Resident, Visitor};
use chrono::{DateTime, Utc};
use intercom_core::{ResidentRecord, VisitorRecord};
use sqlx::{Sqlite, Transaction};

/// Load resident snapshots for a unit, oldest first
///
/// The unit is compared after trimming both sides.
pub async fn load_residents_for_unit(
    tx: &mut Transaction<'_, Sqlite>,
    unit_number: &str,
) -> StorageResult<Vec<ResidentRecord>> {
    let residents = sqlx::query_as::<_, Resident>(
        r#"
        SELECT id, name, unit_number, passcode, created_at, updated_at
        FROM residents
        WHERE trim(unit_number) = ?
        ORDER BY id
        "#,
    )
    .bind(unit_number.trim())
    .fetch_all(&mut **tx)
    .await?;

    Ok(residents.iter().map(Resident::to_record).collect())
}

/// Load visitor snapshots for a unit, oldest first
///
/// # Errors
///
/// Returns a domain error if a stored row holds an unknown status or access type.
pub async fn load_visitors_for_unit(
    tx: &mut Transaction<'_, Sqlite>,
    unit_number: &str,
) -> StorageResult<Vec<VisitorRecord>> {
    let visitors = sqlx::query_as::<_, Visitor>(
        r#"
        SELECT id, name, unit_number, passcode, status, passcode_expires_at,
               access_type, usage_limit, entry_count, host_resident_id,
               created_at, updated_at
        FROM visitors
        WHERE trim(unit_number) = ?
        ORDER BY id
        "#,
    )
    .bind(unit_number.trim())
    .fetch_all(&mut **tx)
    .await?;

    visitors.iter().map(Visitor::to_record).collect()
}

/// Move a visitor whose passcode deadline passed to `expired`
///
/// Only `expected` and `arrived` visitors are touched.
///
/// # Returns
///
/// `true` if the row changed, `false` if it was already in another status.
pub async fn mark_visitor_expired(
    tx: &mut Transaction<'_, Sqlite>,
    visitor_id: i64,
    now: DateTime<Utc>,
) -> StorageResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE visitors
        SET status = 'expired', updated_at = ?
        WHERE id = ? AND status IN ('expected', 'arrived')
        "#,
    )
    .bind(now)
    .bind(visitor_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Count one granted entry against a visitor pass
///
/// The update only applies if the stored counter still equals `previous`,
/// the value the grant was decided on.
///
/// # Returns
///
/// `true` if the counter moved from `previous` to `previous + 1`, `false`
/// if another attempt changed it first.
pub async fn increment_entry_count(
    tx: &mut Transaction<'_, Sqlite>,
    visitor_id: i64,
    previous: u32,
    now: DateTime<Utc>,
) -> StorageResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE visitors
        SET entry_count = entry_count + 1, updated_at = ?
        WHERE id = ? AND entry_count = ?
        "#,
    )
    .bind(now)
    .bind(visitor_id)
    .bind(i64::from(previous))
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Write an access log entry within a transaction
///
/// # Returns
///
/// Returns the auto-generated log ID on success
pub async fn create_access_log(
    tx: &mut Transaction<'_, Sqlite>,
    log: &AccessLog,
) -> StorageResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO access_logs (
            unit_number, resident_id, visitor_id, granted,
            reason, display_message, timestamp, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.unit_number)
    .bind(log.resident_id)
    .bind(log.visitor_id)
    .bind(log.granted)
    .bind(&log.reason)
    .bind(&log.display_message)
    .bind(log.timestamp)
    .bind(log.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}
