use std::collections::HashMap;

use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::job::models::{JobPatch, NewJob, NewLog};
use crate::db::models::{
    ExtraResponseRow, ExtraResponseView, JobLogEntry, JobLogRow, JobRow, JobSummaryRow, StatusRow,
};

const JOB_COLUMNS: &str = "id, title, customer_name, customer_phone, device_type, brand, model, \
     serial, intake_date, status, notes, assigned_to, share_public, public_token, created_at, \
     updated_at";

const LOG_COLUMNS: &str = "id, job_id, message, status, attachment_url, created_by, created_at";

/// Result of the detail fetch: the job, its (possibly enriched) logs, and the
/// log-fetch error when that secondary step failed. A failed primary fetch is
/// an `Err` instead; partial data is only ever assembled around a live job row.
pub struct JobFetch {
    pub job: JobRow,
    pub job_logs: Vec<JobLogEntry>,
    pub logs_error: Option<sqlx::Error>,
}

/// Repository for job, log and status queries against the hosted store.
pub struct JobRepository;

impl JobRepository {
    /// List all jobs, newest activity first. No pagination.
    pub async fn list(pool: &Pool<Postgres>) -> Result<Vec<JobSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, JobSummaryRow>(
            "SELECT id, title, status, customer_name, device_type, brand, model, updated_at \
             FROM jobs ORDER BY updated_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Fetch a single job row by id.
    pub async fn fetch(pool: &Pool<Postgres>, id: Uuid) -> Result<JobRow, sqlx::Error> {
        sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Fetch the logs of a job, oldest first.
    pub async fn logs(pool: &Pool<Postgres>, job_id: Uuid) -> Result<Vec<JobLogRow>, sqlx::Error> {
        sqlx::query_as::<_, JobLogRow>(&format!(
            "SELECT {LOG_COLUMNS} FROM job_logs WHERE job_id = $1 ORDER BY created_at ASC"
        ))
        .bind(job_id)
        .fetch_all(pool)
        .await
    }

    /// Capability query against the optional `job_extra_responses` relation.
    ///
    /// The relation may not exist in a given deployment, so any failure here
    /// means "no enrichment available" rather than an error: the caller gets
    /// `None` and the logs are returned unannotated.
    pub async fn extra_responses(
        pool: &Pool<Postgres>,
        log_ids: &[Uuid],
    ) -> Option<HashMap<Uuid, ExtraResponseView>> {
        let res = sqlx::query_as::<_, ExtraResponseRow>(
            "SELECT log_id, decision, created_at FROM job_extra_responses \
             WHERE log_id = ANY($1)",
        )
        .bind(log_ids.to_vec())
        .fetch_all(pool)
        .await;

        match res {
            Ok(rows) => Some(rows.into_iter().map(|r| (r.log_id, r.into())).collect()),
            Err(e) => {
                debug!("extra responses unavailable: {}", e);
                None
            }
        }
    }

    /// Assemble the denormalized detail view for one job.
    ///
    /// Ordering contract: job fetch, then log fetch, then enrichment. A failed
    /// job fetch aborts immediately. A failed log fetch is carried in
    /// `logs_error` while the job itself is still returned. Enrichment only
    /// runs when at least one log was retrieved and can never fail the call.
    pub async fn detail(pool: &Pool<Postgres>, id: Uuid) -> Result<JobFetch, sqlx::Error> {
        let job = Self::fetch(pool, id).await?;

        let (logs, logs_error) = match Self::logs(pool, id).await {
            Ok(logs) => (logs, None),
            Err(e) => {
                warn!("fetching logs for job {} failed: {}", id, e);
                (Vec::new(), Some(e))
            }
        };

        let extras = if logs.is_empty() {
            None
        } else {
            let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
            Self::extra_responses(pool, &ids).await
        };

        Ok(JobFetch {
            job,
            job_logs: merge_extra_responses(logs, extras),
            logs_error,
        })
    }

    /// Insert a new job and return the full row.
    ///
    /// `assigned_to` is always the authenticated user resolved by the caller;
    /// a caller-supplied assignee in the payload is never trusted.
    pub async fn create(
        pool: &Pool<Postgres>,
        payload: &NewJob,
        assigned_to: Uuid,
    ) -> Result<JobRow, sqlx::Error> {
        debug!("creating job: title={}", payload.title);

        let row = sqlx::query_as::<_, JobRow>(&format!(
            "INSERT INTO jobs (title, customer_name, customer_phone, device_type, brand, model, \
             serial, intake_date, status, notes, assigned_to, share_public) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.customer_name)
        .bind(&payload.customer_phone)
        .bind(&payload.device_type)
        .bind(&payload.brand)
        .bind(&payload.model)
        .bind(&payload.serial)
        .bind(payload.intake_date)
        .bind(&payload.status)
        .bind(&payload.notes)
        .bind(assigned_to)
        .bind(payload.share_public)
        .fetch_one(pool)
        .await?;

        debug!("job created with id={}", row.id);
        Ok(row)
    }

    /// Partial update: only fields present in the patch are written.
    ///
    /// Built dynamically so absent fields are left untouched rather than
    /// overwritten with NULL. `updated_at` is always refreshed, which also
    /// keeps the SET list non-empty for an empty patch.
    pub async fn update(
        pool: &Pool<Postgres>,
        id: Uuid,
        patch: &JobPatch,
    ) -> Result<JobRow, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE jobs SET updated_at = now()");

        if let Some(v) = &patch.title {
            qb.push(", title = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.customer_name {
            qb.push(", customer_name = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.customer_phone {
            qb.push(", customer_phone = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.device_type {
            qb.push(", device_type = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.brand {
            qb.push(", brand = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.model {
            qb.push(", model = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.serial {
            qb.push(", serial = ");
            qb.push_bind(v);
        }
        if let Some(v) = patch.intake_date {
            qb.push(", intake_date = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.status {
            qb.push(", status = ");
            qb.push_bind(v);
        }
        if let Some(v) = &patch.notes {
            qb.push(", notes = ");
            qb.push_bind(v);
        }
        if let Some(v) = patch.share_public {
            qb.push(", share_public = ");
            qb.push_bind(v);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {JOB_COLUMNS}"));

        qb.build_query_as::<JobRow>().fetch_one(pool).await
    }

    /// Append a log entry to a job, stamped with the authenticated user.
    pub async fn add_log(
        pool: &Pool<Postgres>,
        job_id: Uuid,
        payload: &NewLog,
        created_by: Uuid,
    ) -> Result<JobLogRow, sqlx::Error> {
        sqlx::query_as::<_, JobLogRow>(&format!(
            "INSERT INTO job_logs (job_id, message, status, attachment_url, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {LOG_COLUMNS}"
        ))
        .bind(job_id)
        .bind(&payload.message)
        .bind(&payload.status)
        .bind(&payload.attachment_url)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    /// Full status reference set, ordered by id.
    pub async fn statuses(pool: &Pool<Postgres>) -> Result<Vec<StatusRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusRow>("SELECT id, code, label FROM jobs_status ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    /// Token-authorized tracking lookup via the privileged SQL function.
    /// The backend defines the payload shape; it is passed through as JSON.
    pub async fn public_tracking(
        pool: &Pool<Postgres>,
        token: &str,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar::<_, serde_json::Value>("SELECT to_jsonb(get_public_tracking($1))")
            .bind(token)
            .fetch_one(pool)
            .await
    }

    /// Record a customer decision against a log, authorized by token only.
    pub async fn respond_extra(
        pool: &Pool<Postgres>,
        token: &str,
        log_id: Uuid,
        decision: &str,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar::<_, serde_json::Value>("SELECT to_jsonb(respond_extra($1, $2, $3))")
            .bind(token)
            .bind(log_id)
            .bind(decision)
            .fetch_one(pool)
            .await
    }
}

/// Annotate each log with its extra response, if an enrichment map is present.
///
/// `None` means the optional relation was unavailable: every entry comes back
/// with `extra_response` unset. With a map, logs without a recorded decision
/// still get `None` individually.
pub fn merge_extra_responses(
    logs: Vec<JobLogRow>,
    extras: Option<HashMap<Uuid, ExtraResponseView>>,
) -> Vec<JobLogEntry> {
    match extras {
        Some(mut by_log) => logs
            .into_iter()
            .map(|log| {
                let extra_response = by_log.remove(&log.id);
                JobLogEntry { log, extra_response }
            })
            .collect(),
        None => logs
            .into_iter()
            .map(|log| JobLogEntry {
                log,
                extra_response: None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn log(id: Uuid) -> JobLogRow {
        JobLogRow {
            id,
            job_id: Uuid::new_v4(),
            message: "checked in".into(),
            status: None,
            attachment_url: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn merge_without_enrichment_map_leaves_logs_unannotated() {
        let logs = vec![log(Uuid::new_v4()), log(Uuid::new_v4())];
        let merged = merge_extra_responses(logs, None);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|e| e.extra_response.is_none()));
    }

    #[test]
    fn merge_annotates_only_matching_logs() {
        let answered = Uuid::new_v4();
        let unanswered = Uuid::new_v4();
        let logs = vec![log(answered), log(unanswered)];

        let mut extras = HashMap::new();
        extras.insert(
            answered,
            ExtraResponseView {
                decision: "approved".into(),
                created_at: Utc::now(),
            },
        );

        let merged = merge_extra_responses(logs, Some(extras));
        assert_eq!(
            merged[0].extra_response.as_ref().map(|e| e.decision.as_str()),
            Some("approved")
        );
        assert!(merged[1].extra_response.is_none());
    }
}
