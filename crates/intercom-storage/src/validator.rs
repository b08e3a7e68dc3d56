use crate::error::{StorageError, StorageResult};
use crate::models::AccessLog;
use crate::transaction;
use chrono::{DateTime, Utc};
use intercom_core::constants::DEFAULT_CONFLICT_RETRIES;
use intercom_core::{AccessValidator, RecordMutation, Verdict};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause before retry `n` is `n` times this
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Configuration for [`StoredValidator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Attempts re-run after a write conflict before giving up
    pub max_conflict_retries: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}

impl ValidatorConfig {
    pub fn max_conflict_retries(mut self, retries: usize) -> Self {
        self.max_conflict_retries = retries;
        self
    }
}

/// Access validator backed by the SQLite database
///
/// Runs [`AccessValidator`] against the residents and visitors stored for the
/// entered unit, then persists the outcome in the same transaction:
///
/// 1. **Load**: residents and visitors of the unit
/// 2. **Decide**: pure validation at the attempt time
/// 3. **Apply**: expire the pass, or count the entry on a capped pass
/// 4. **Audit**: write one `access_logs` row
/// 5. **Commit**
///
/// Counting an entry only succeeds if the stored counter still holds the
/// value the decision was based on. When another attempt got there first, or
/// SQLite reports the database busy, the whole attempt is re-run from step 1.
/// A capped pass therefore never exceeds its limit, however many kiosks
/// submit the same passcode at once.
///
/// # Examples
///
/// ```no_run
/// use intercom_storage::{Database, DatabaseConfig, StoredValidator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::open(&DatabaseConfig::new("intercom.db")).await?;
/// let validator = StoredValidator::new(db.pool().clone());
///
/// let verdict = validator.check("204", "4521").await?;
/// println!("{}", verdict.display_message());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StoredValidator {
    pool: SqlitePool,
    validator: AccessValidator,
    config: ValidatorConfig,
}

impl StoredValidator {
    /// Create a validator with the default configuration
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_config(pool, ValidatorConfig::default())
    }

    pub fn with_config(pool: SqlitePool, config: ValidatorConfig) -> Self {
        Self {
            pool,
            validator: AccessValidator::new(),
            config,
        }
    }

    /// Validate an attempt made now
    ///
    /// # Errors
    ///
    /// Returns error if database operations fail or conflicts persist past
    /// `max_conflict_retries`. Denials are `Ok(Verdict::Denied { .. })`.
    pub async fn check(&self, unit_number: &str, passcode: &str) -> StorageResult<Verdict> {
        self.check_at(unit_number, passcode, Utc::now()).await
    }

    /// Validate an attempt made at `now`
    pub async fn check_at(
        &self,
        unit_number: &str,
        passcode: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Verdict> {
        let mut retries = 0;

        loop {
            match self.attempt(unit_number, passcode, now).await {
                Ok(Some(verdict)) => {
                    match &verdict {
                        Verdict::Granted { subject, .. } => {
                            info!(unit = unit_number.trim(), ?subject, "access granted");
                        }
                        Verdict::Denied { reason, visitor_id, .. } => {
                            info!(unit = unit_number.trim(), reason = %reason, ?visitor_id, "access denied");
                        }
                    }
                    return Ok(verdict);
                }
                Ok(None) => debug!(unit = unit_number.trim(), "entry count changed concurrently"),
                Err(e) if e.is_busy() => debug!(unit = unit_number.trim(), error = %e, "database busy"),
                Err(e) => return Err(e),
            }

            if retries >= self.config.max_conflict_retries {
                warn!(unit = unit_number.trim(), retries, "giving up after write conflicts");
                return Err(StorageError::ValidationFailed(
                    retries,
                    format!("write conflict on unit {}", unit_number.trim()),
                ));
            }

            retries += 1;
            tokio::time::sleep(RETRY_BACKOFF * retries as u32).await;
        }
    }

    /// One pass through load, decide, apply, audit and commit.
    ///
    /// Returns `Ok(None)` when the entry counter moved under us; the
    /// transaction is dropped and rolled back.
    async fn attempt(
        &self,
        unit_number: &str,
        passcode: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Verdict>> {
        let mut tx = self.pool.begin().await?;

        let residents = transaction::load_residents_for_unit(&mut tx, unit_number).await?;
        let visitors = transaction::load_visitors_for_unit(&mut tx, unit_number).await?;

        let verdict = self
            .validator
            .validate_at(unit_number, passcode, &residents, &visitors, now);

        match verdict.mutation() {
            Some(RecordMutation::MarkExpired { id }) => {
                transaction::mark_visitor_expired(&mut tx, *id, now).await?;
            }
            Some(RecordMutation::EntryCount { id, previous, .. }) => {
                if !transaction::increment_entry_count(&mut tx, *id, *previous, now).await? {
                    return Ok(None);
                }
            }
            None => {}
        }

        let log = AccessLog::from_verdict(unit_number, &verdict, now);
        transaction::create_access_log(&mut tx, &log).await?;

        tx.commit().await?;
        Ok(Some(verdict))
    }
}
