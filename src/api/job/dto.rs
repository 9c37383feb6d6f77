use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{JobLogEntry, JobRow};
use crate::utils::date::{format_date, format_date_time};

/// Job as exposed over the API.
///
/// Identical to the stored row except that the public tracking token is
/// withheld unless sharing is enabled, and display-formatted dates are
/// attached for the UI.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub title: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub intake_date: Option<NaiveDate>,
    pub intake_date_display: String,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub share_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobView {
    fn from(row: JobRow) -> Self {
        let public_token = if row.share_public {
            row.public_token
        } else {
            None
        };
        let intake = row.intake_date.map(|d| d.to_string());
        let created = row.created_at.to_rfc3339();

        JobView {
            id: row.id,
            title: row.title,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            device_type: row.device_type,
            brand: row.brand,
            model: row.model,
            serial: row.serial,
            intake_date: row.intake_date,
            intake_date_display: format_date(intake.as_deref()),
            status: row.status,
            notes: row.notes,
            assigned_to: row.assigned_to,
            share_public: row.share_public,
            public_token,
            created_at: row.created_at,
            created_at_display: format_date_time(Some(&created)),
            updated_at: row.updated_at,
        }
    }
}

/// Response for job creation and update.
#[derive(Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: JobView,
}

/// Detail view: job fields plus the ordered log sequence.
///
/// `error` carries the log-fetch failure when only partial data could be
/// assembled; the job fields themselves are always from a successful fetch.
#[derive(Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobView,
    pub job_logs: Vec<JobLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn row(share_public: bool) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: "Broken screen".into(),
            customer_name: "Ada".into(),
            customer_phone: None,
            device_type: Some("laptop".into()),
            brand: None,
            model: None,
            serial: None,
            intake_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            status: "received".into(),
            notes: None,
            assigned_to: Some(Uuid::new_v4()),
            share_public,
            public_token: Some("tok-123".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_token_is_withheld_unless_sharing_is_enabled() {
        let private = JobView::from(row(false));
        assert!(private.public_token.is_none());

        let shared = JobView::from(row(true));
        assert_eq!(shared.public_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn intake_date_display_uses_fixed_day_month_year() {
        let view = JobView::from(row(false));
        assert_eq!(view.intake_date_display, "05/03/2024");
    }
}
