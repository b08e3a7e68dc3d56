#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::AccessLog;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository trait for AccessLog entity operations
///
/// Kiosk attempts are written inside the validation transaction (see
/// [`crate::transaction::create_access_log`]); this repository serves the
/// management side: audits and reports.
pub trait AccessLogRepository: Send + Sync {
    /// Create a new access log entry
    async fn create(&self, log: &AccessLog) -> StorageResult<i64>;

    /// Most recent attempts, newest first
    async fn find_recent(&self, limit: i64) -> StorageResult<Vec<AccessLog>>;

    /// Attempts for a unit, newest first
    async fn find_by_unit(&self, unit_number: &str, limit: i64) -> StorageResult<Vec<AccessLog>>;

    /// Attempts that matched a visitor, newest first
    async fn find_by_visitor(&self, visitor_id: i64, limit: i64) -> StorageResult<Vec<AccessLog>>;

    /// All attempts within a time range, oldest first
    async fn find_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<AccessLog>>;

    /// Count attempts in a time range
    async fn count_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Count denied attempts for a unit since a given time
    async fn count_denied_by_unit(
        &self,
        unit_number: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<i64>;
}

/// SQLite implementation of AccessLogRepository
pub struct SqliteAccessLogRepository {
    pool: SqlitePool,
}

impl SqliteAccessLogRepository {
    /// Create a new SQLite access log repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AccessLogRepository for SqliteAccessLogRepository {
    async fn create(&self, log: &AccessLog) -> StorageResult<i64> {
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
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_recent(&self, limit: i64) -> StorageResult<Vec<AccessLog>> {
        let logs = sqlx::query_as::<_, AccessLog>(
            r#"
            SELECT id, unit_number, resident_id, visitor_id, granted,
                   reason, display_message, timestamp, created_at
            FROM access_logs
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn find_by_unit(&self, unit_number: &str, limit: i64) -> StorageResult<Vec<AccessLog>> {
        let logs = sqlx::query_as::<_, AccessLog>(
            r#"
            SELECT id, unit_number, resident_id, visitor_id, granted,
                   reason, display_message, timestamp, created_at
            FROM access_logs
            WHERE unit_number = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(unit_number.trim())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn find_by_visitor(&self, visitor_id: i64, limit: i64) -> StorageResult<Vec<AccessLog>> {
        let logs = sqlx::query_as::<_, AccessLog>(
            r#"
            SELECT id, unit_number, resident_id, visitor_id, granted,
                   reason, display_message, timestamp, created_at
            FROM access_logs
            WHERE visitor_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(visitor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn find_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<AccessLog>> {
        let logs = sqlx::query_as::<_, AccessLog>(
            r#"
            SELECT id, unit_number, resident_id, visitor_id, granted,
                   reason, display_message, timestamp, created_at
            FROM access_logs
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn count_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM access_logs WHERE timestamp >= ? AND timestamp <= ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn count_denied_by_unit(
        &self,
        unit_number: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM access_logs
            WHERE unit_number = ? AND granted = 0 AND timestamp >= ?
            "#,
        )
        .bind(unit_number.trim())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
