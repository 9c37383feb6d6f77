use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Full database representation of a job row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub intake_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub share_public: bool,
    pub public_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow projection used by the job list.
#[derive(Debug, FromRow, Serialize)]
pub struct JobSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub customer_name: String,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A single append-only log entry on a job.
#[derive(Debug, FromRow, Serialize)]
pub struct JobLogRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub message: String,
    pub status: Option<String>,
    pub attachment_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row of the optional `job_extra_responses` relation.
#[derive(Debug, FromRow)]
pub struct ExtraResponseRow {
    pub log_id: Uuid,
    pub decision: String,
    pub created_at: DateTime<Utc>,
}

/// Customer decision attached to a log when the optional relation is present.
#[derive(Debug, Clone, Serialize)]
pub struct ExtraResponseView {
    pub decision: String,
    pub created_at: DateTime<Utc>,
}

impl From<ExtraResponseRow> for ExtraResponseView {
    fn from(row: ExtraResponseRow) -> Self {
        ExtraResponseView {
            decision: row.decision,
            created_at: row.created_at,
        }
    }
}

/// Log entry as returned by the detail fetch, optionally enriched.
#[derive(Debug, Serialize)]
pub struct JobLogEntry {
    #[serde(flatten)]
    pub log: JobLogRow,
    pub extra_response: Option<ExtraResponseView>,
}

/// Shared status reference data (`jobs_status` table).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusRow {
    pub id: i32,
    pub code: String,
    pub label: String,
}
