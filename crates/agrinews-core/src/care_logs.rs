use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One plant care observation, as fed to the weekly suggestion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareLog {
    pub plant: String,
    pub log_date: DateTime<Utc>,
    pub watered: bool,
    pub fertilizer_applied: Option<String>,
    pub disease: Option<String>,
    pub height_cm: Option<Decimal>,
    pub growth_stage: Option<String>,
    pub note: Option<String>,
}

/// Returns at most `limit` logs, newest `log_date` first.
#[must_use]
pub fn most_recent(mut logs: Vec<CareLog>, limit: usize) -> Vec<CareLog> {
    logs.sort_by(|a, b| b.log_date.cmp(&a.log_date));
    logs.truncate(limit);
    logs
}
