//! Access activity summaries built from the access log.

use crate::error::StorageResult;
use crate::models::AccessLog;
use crate::repositories::AccessLogRepository;
use chrono::{DateTime, Utc};
use intercom_core::DenyReason;
use serde::Serialize;
use std::collections::BTreeMap;

/// Attempts recorded for one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitActivity {
    pub unit_number: String,
    pub granted: u64,
    pub denied: u64,
}

/// Summary of kiosk attempts over a time range
///
/// Denials are keyed by reason code (`no_match`, `status_invalid`,
/// `expired`, `usage_limit_reached`); rows with an unrecognized code are
/// counted under `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total: u64,
    pub granted: u64,
    pub denied: u64,
    pub denied_by_reason: BTreeMap<String, u64>,
    /// Sorted by unit number
    pub units: Vec<UnitActivity>,
}

impl AccessReport {
    /// Summarize already loaded log rows.
    pub fn from_logs(start: DateTime<Utc>, end: DateTime<Utc>, logs: &[AccessLog]) -> Self {
        let mut denied_by_reason = BTreeMap::new();
        let mut units: BTreeMap<&str, UnitActivity> = BTreeMap::new();
        let mut granted = 0;

        for log in logs {
            let unit = units
                .entry(log.unit_number.as_str())
                .or_insert_with(|| UnitActivity {
                    unit_number: log.unit_number.clone(),
                    ..UnitActivity::default()
                });

            if log.was_granted() {
                granted += 1;
                unit.granted += 1;
            } else {
                unit.denied += 1;
                let code = log.get_reason().map_or("unknown", DenyReason::code);
                *denied_by_reason.entry(code.to_string()).or_insert(0) += 1;
            }
        }

        let total = logs.len() as u64;
        Self {
            start,
            end,
            total,
            granted,
            denied: total - granted,
            denied_by_reason,
            units: units.into_values().collect(),
        }
    }

    /// Load the range from the access log and summarize it.
    pub async fn generate<R: AccessLogRepository>(
        repo: &R,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Self> {
        let logs = repo.find_by_time_range(start, end).await?;
        Ok(Self::from_logs(start, end, &logs))
    }

    /// Denials recorded for a reason
    pub fn denied_for(&self, reason: DenyReason) -> u64 {
        self.denied_by_reason.get(reason.code()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::repositories::SqliteAccessLogRepository;
    use chrono::Duration;
    use intercom_core::{AccessSubject, Verdict};

    fn log(unit: &str, verdict: Verdict) -> AccessLog {
        let mut log = AccessLog::from_verdict(unit, &verdict, Utc::now());
        log.resident_id = None;
        log.visitor_id = None;
        log
    }

    fn grant() -> Verdict {
        Verdict::Granted {
            subject: AccessSubject::Resident(1),
            mutation: None,
        }
    }

    fn deny(reason: DenyReason) -> Verdict {
        Verdict::Denied {
            reason,
            visitor_id: None,
            mutation: None,
        }
    }

    #[test]
    fn test_from_logs_counts() {
        let logs = vec![
            log("204", grant()),
            log("204", deny(DenyReason::NoMatch)),
            log("305", deny(DenyReason::NoMatch)),
            log("305", deny(DenyReason::Expired)),
        ];
        let now = Utc::now();
        let report = AccessReport::from_logs(now - Duration::hours(1), now, &logs);

        assert_eq!(report.total, 4);
        assert_eq!(report.granted, 1);
        assert_eq!(report.denied, 3);
        assert_eq!(report.denied_for(DenyReason::NoMatch), 2);
        assert_eq!(report.denied_for(DenyReason::Expired), 1);
        assert_eq!(report.denied_for(DenyReason::UsageLimitReached), 0);
        assert_eq!(
            report.units,
            vec![
                UnitActivity {
                    unit_number: "204".to_string(),
                    granted: 1,
                    denied: 1
                },
                UnitActivity {
                    unit_number: "305".to_string(),
                    granted: 0,
                    denied: 2
                },
            ]
        );
    }

    #[test]
    fn test_unknown_reason_bucket() {
        let mut row = log("204", deny(DenyReason::NoMatch));
        row.reason = Some("legacy".to_string());
        let now = Utc::now();
        let report = AccessReport::from_logs(now, now, &[row]);

        assert_eq!(report.denied_by_reason.get("unknown"), Some(&1));
    }

    #[test]
    fn test_empty_report_serializes() {
        let now = Utc::now();
        let report = AccessReport::from_logs(now, now, &[]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["total"], 0);
        assert!(json["deniedByReason"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_uses_time_range() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteAccessLogRepository::new(db.pool().clone());
        let now = Utc::now();

        let mut old = log("204", grant());
        old.timestamp = now - Duration::days(3);
        repo.create(&old).await.unwrap();
        repo.create(&log("204", deny(DenyReason::StatusInvalid))).await.unwrap();

        let report = AccessReport::generate(&repo, now - Duration::days(1), now + Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.denied_for(DenyReason::StatusInvalid), 1);
    }
}
