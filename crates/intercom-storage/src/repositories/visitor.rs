#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Visitor;
use chrono::{DateTime, Utc};
use intercom_core::VisitorStatus;
use sqlx::SqlitePool;

const VISITOR_COLUMNS: &str = "id, name, unit_number, passcode, status, passcode_expires_at, \
     access_type, usage_limit, entry_count, host_resident_id, created_at, updated_at";

/// Repository trait for Visitor entity operations
///
/// Status changes go through [`VisitorRepository::update_status`], which
/// enforces the visitor lifecycle. The kiosk-side mutations (expiring a pass,
/// counting an entry) live in [`crate::transaction`] because they must run
/// inside the validation transaction.
pub trait VisitorRepository: Send + Sync {
    /// Find a visitor by ID
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Visitor>>;

    /// Find all visitors of a unit (trimmed comparison), oldest first
    async fn find_by_unit(&self, unit_number: &str) -> StorageResult<Vec<Visitor>>;

    /// List visitors whose status still allows entry (`expected` or `arrived`)
    async fn list_active(&self) -> StorageResult<Vec<Visitor>>;

    /// Create a new visitor
    async fn create(&self, visitor: &Visitor) -> StorageResult<i64>;

    /// Update an existing visitor (all columns except status)
    async fn update(&self, visitor: &Visitor) -> StorageResult<()>;

    /// Move a visitor to a new lifecycle status
    async fn update_status(&self, id: i64, status: VisitorStatus) -> StorageResult<()>;

    /// Delete a visitor by ID
    async fn delete(&self, id: i64) -> StorageResult<()>;

    /// Archive `departed`, `denied` and `expired` visitors last updated before `cutoff`
    async fn archive_inactive(&self, cutoff: DateTime<Utc>) -> StorageResult<u64>;
}

/// SQLite implementation of VisitorRepository
pub struct SqliteVisitorRepository {
    pool: SqlitePool,
}

impl SqliteVisitorRepository {
    /// Create a new SQLite visitor repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl VisitorRepository for SqliteVisitorRepository {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Visitor>> {
        let visitor =
            sqlx::query_as::<_, Visitor>(&format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(visitor)
    }

    async fn find_by_unit(&self, unit_number: &str) -> StorageResult<Vec<Visitor>> {
        let visitors = sqlx::query_as::<_, Visitor>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors WHERE trim(unit_number) = ? ORDER BY id"
        ))
        .bind(unit_number.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(visitors)
    }

    async fn list_active(&self) -> StorageResult<Vec<Visitor>> {
        let visitors = sqlx::query_as::<_, Visitor>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors \
             WHERE status IN ('expected', 'arrived') \
             ORDER BY unit_number, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(visitors)
    }

    async fn create(&self, visitor: &Visitor) -> StorageResult<i64> {
        // Reject unknown enum text before it reaches the CHECK constraints
        visitor.to_record()?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO visitors (
                name, unit_number, passcode, status, passcode_expires_at,
                access_type, usage_limit, entry_count, host_resident_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&visitor.name)
        .bind(&visitor.unit_number)
        .bind(&visitor.passcode)
        .bind(&visitor.status)
        .bind(visitor.passcode_expires_at)
        .bind(&visitor.access_type)
        .bind(visitor.usage_limit)
        .bind(visitor.entry_count)
        .bind(visitor.host_resident_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, visitor: &Visitor) -> StorageResult<()> {
        visitor.to_record()?;

        let result = sqlx::query(
            r#"
            UPDATE visitors
            SET name = ?, unit_number = ?, passcode = ?, passcode_expires_at = ?,
                access_type = ?, usage_limit = ?, entry_count = ?,
                host_resident_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&visitor.name)
        .bind(&visitor.unit_number)
        .bind(&visitor.passcode)
        .bind(visitor.passcode_expires_at)
        .bind(&visitor.access_type)
        .bind(visitor.usage_limit)
        .bind(visitor.entry_count)
        .bind(visitor.host_resident_id)
        .bind(Utc::now())
        .bind(visitor.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Visitor", "id", visitor.id));
        }

        Ok(())
    }

    async fn update_status(&self, id: i64, status: VisitorStatus) -> StorageResult<()> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("Visitor", "id", id))?;

        let from: VisitorStatus = current.status.parse()?;
        from.transition_to(status)?;

        // Guard on the old status so a concurrent change is not overwritten
        let result = sqlx::query(
            "UPDATE visitors SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(format!(
                "visitor {id} left {from} before it could become {status}"
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM visitors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Visitor", "id", id));
        }

        Ok(())
    }

    async fn archive_inactive(&self, cutoff: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE visitors
            SET status = 'archived', updated_at = ?
            WHERE status IN ('departed', 'denied', 'expired')
              AND updated_at < ?
            "#,
        )
        .bind(Utc::now())
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
