use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{
    get, patch, post,
    web::{scope, Data, Path, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;
use uuid::Uuid;

use super::models::{JobPatch, NewJob, NewLog};
use super::service::{JobService, ServiceError};
use crate::api::auth::CurrentUser;
use crate::storage::{AttachmentStore, StoredAttachment};

#[get("")]
async fn list_jobs(service: Data<JobService>) -> Result<HttpResponse, ServiceError> {
    let jobs = service.list_jobs().await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let detail = service.get_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    user: CurrentUser,
    payload: Json<NewJob>,
) -> Result<HttpResponse, ServiceError> {
    let created = service.create_job(user.0, &payload).await?;
    Ok(HttpResponse::Created().json(created))
}

#[patch("/{id}")]
async fn update_job(
    service: Data<JobService>,
    path: Path<Uuid>,
    payload: Json<JobPatch>,
) -> Result<HttpResponse, ServiceError> {
    let updated = service.update_job(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[post("/{id}/logs")]
async fn add_log(
    service: Data<JobService>,
    user: CurrentUser,
    path: Path<Uuid>,
    payload: Json<NewLog>,
) -> Result<HttpResponse, ServiceError> {
    let log = service.add_log(user.0, path.into_inner(), &payload).await?;
    Ok(HttpResponse::Created().json(log))
}

#[derive(MultipartForm)]
struct AttachmentUpload {
    file: TempFile,
}

#[post("/{id}/attachments")]
async fn upload_attachment(
    store: Data<AttachmentStore>,
    _user: CurrentUser,
    path: Path<Uuid>,
    MultipartForm(form): MultipartForm<AttachmentUpload>,
) -> Result<HttpResponse, ServiceError> {
    let job_id = path.into_inner();
    let name = form.file.file_name.as_deref().unwrap_or("attachment");

    let key = AttachmentStore::object_key(job_id, name);
    let dest = store.prepare(&key).map_err(ServiceError::Storage)?;

    // no-clobber: a duplicate key is a bug, never an overwrite
    form.file
        .file
        .persist_noclobber(dest)
        .map_err(|e| ServiceError::Storage(e.error))?;

    let public_url = store.public_url(&key);
    Ok(HttpResponse::Created().json(StoredAttachment {
        path: key,
        public_url,
    }))
}

#[get("")]
async fn list_statuses(service: Data<JobService>) -> Result<HttpResponse, ServiceError> {
    let statuses = service.list_statuses().await?;
    Ok(HttpResponse::Ok().json(statuses))
}

#[post("/refresh")]
async fn refresh_statuses(
    service: Data<JobService>,
    _user: CurrentUser,
) -> Result<HttpResponse, ServiceError> {
    let statuses = service.refresh_statuses().await?;
    Ok(HttpResponse::Ok().json(statuses))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(list_jobs)
            .service(create_job)
            .service(get_job)
            .service(update_job)
            .service(add_log)
            .service(upload_attachment),
    );
}

pub fn status_config(config: &mut ServiceConfig) {
    config.service(
        scope("statuses")
            .service(list_statuses)
            .service(refresh_statuses),
    );
}
