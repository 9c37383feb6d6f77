use std::fmt;
use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};
use sqlx::{Pool, Postgres};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dto::{JobDetailResponse, JobResponse, JobView};
use super::models::{JobPatch, NewJob, NewLog};
use crate::api::validation::ErrorResponse;
use crate::db::job_repository::JobRepository;
use crate::db::models::{JobLogRow, JobSummaryRow, StatusRow};
use crate::db::status_cache::StatusCache;

/// Service-level errors, surfaced to clients as JSON error responses.
#[derive(Debug)]
pub enum ServiceError {
    /// Query against the hosted store failed
    Database(sqlx::Error),

    /// The requested job does not exist
    NotFound(Uuid),

    /// No authenticated user context on a call that stamps one
    Unauthorized,

    /// Attachment persistence failed
    Storage(std::io::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(e) => write!(f, "Database error: {}", e),
            ServiceError::NotFound(id) => write!(f, "Job not found: {}", id),
            ServiceError::Unauthorized => write!(f, "No authenticated user"),
            ServiceError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Database(e) => {
                error!("Database error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                })
            }
            ServiceError::NotFound(id) => {
                warn!("Job not found: {}", id);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({"message": format!("Job with id {} not found", id)}),
                })
            }
            ServiceError::Unauthorized => {
                warn!("Rejected write without an authenticated user");
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Unauthorized".to_string(),
                    fields: serde_json::json!({"message": "An authenticated user is required"}),
                })
            }
            ServiceError::Storage(e) => {
                error!("Attachment storage error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to store attachment".to_string(),
                    fields: serde_json::json!({"message": "Storage error occurred"}),
                })
            }
        }
    }
}

fn map_fetch_err(id: Uuid, e: sqlx::Error) -> ServiceError {
    match e {
        sqlx::Error::RowNotFound => ServiceError::NotFound(id),
        other => ServiceError::Database(other),
    }
}

/// Job service: thin business layer over the repository and status cache.
pub struct JobService {
    pool: Pool<Postgres>,
    statuses: Arc<StatusCache>,
}

impl JobService {
    pub fn new(pool: Pool<Postgres>, statuses: Arc<StatusCache>) -> Self {
        Self { pool, statuses }
    }

    /// Full job list, newest activity first.
    pub async fn list_jobs(&self) -> Result<Vec<JobSummaryRow>, ServiceError> {
        JobRepository::list(&self.pool)
            .await
            .map_err(ServiceError::Database)
    }

    /// Denormalized detail view for one job.
    ///
    /// A missing or unreadable job is an error; a failed log fetch is reported
    /// through the response's `error` field next to the job data it could
    /// still assemble.
    pub async fn get_job(&self, id: Uuid) -> Result<JobDetailResponse, ServiceError> {
        let fetch = JobRepository::detail(&self.pool, id)
            .await
            .map_err(|e| map_fetch_err(id, e))?;

        Ok(JobDetailResponse {
            job: JobView::from(fetch.job),
            job_logs: fetch.job_logs,
            error: fetch.logs_error.map(|e| e.to_string()),
        })
    }

    /// Create a job assigned to the authenticated user.
    pub async fn create_job(&self, user: Uuid, payload: &NewJob) -> Result<JobResponse, ServiceError> {
        info!("Service: creating job '{}' for user {}", payload.title, user);

        let row = JobRepository::create(&self.pool, payload, user)
            .await
            .map_err(ServiceError::Database)?;

        info!("Service: job created with id={}", row.id);

        Ok(JobResponse {
            message: "Job created successfully".to_string(),
            job: JobView::from(row),
        })
    }

    /// Apply a partial update to a job.
    pub async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<JobResponse, ServiceError> {
        let row = JobRepository::update(&self.pool, id, patch)
            .await
            .map_err(|e| map_fetch_err(id, e))?;

        Ok(JobResponse {
            message: "Job updated successfully".to_string(),
            job: JobView::from(row),
        })
    }

    /// Append a log entry, stamped with the authenticated user.
    pub async fn add_log(
        &self,
        user: Uuid,
        job_id: Uuid,
        payload: &NewLog,
    ) -> Result<JobLogRow, ServiceError> {
        JobRepository::add_log(&self.pool, job_id, payload, user)
            .await
            .map_err(|e| map_fetch_err(job_id, e))
    }

    /// Status reference set, served from the cache.
    pub async fn list_statuses(&self) -> Result<Vec<StatusRow>, ServiceError> {
        self.statuses
            .get(&self.pool)
            .await
            .map_err(ServiceError::Database)
    }

    /// Drop the cached status set and reload it from the store.
    pub async fn refresh_statuses(&self) -> Result<Vec<StatusRow>, ServiceError> {
        self.statuses.invalidate().await;
        self.list_statuses().await
    }

    /// Token-authorized tracking payload, opaque to this service.
    pub async fn public_tracking(&self, token: &str) -> Result<serde_json::Value, ServiceError> {
        JobRepository::public_tracking(&self.pool, token)
            .await
            .map_err(ServiceError::Database)
    }

    /// Record a customer decision, authorized by token possession only.
    pub async fn respond_extra(
        &self,
        token: &str,
        log_id: Uuid,
        decision: &str,
    ) -> Result<serde_json::Value, ServiceError> {
        info!("Service: recording decision for log {}", log_id);

        JobRepository::respond_extra(&self.pool, token, log_id, decision)
            .await
            .map_err(ServiceError::Database)
    }
}
