//! Public tracking endpoints. No user session here: the opaque token is the
//! only credential, checked by the backend's SQL functions.

use actix_web::{
    get, post,
    web::{scope, Data, Path, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::job::service::{JobService, ServiceError};

/// Customer decision posted against a suggested-extra log entry.
#[derive(Debug, Deserialize, Validate)]
pub struct RespondExtra {
    #[validate(length(min = 1, max = 40, message = "Decision must not be empty"))]
    pub decision: String,
}

#[get("/{token}")]
async fn public_tracking(
    service: Data<JobService>,
    path: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let payload = service.public_tracking(&path).await?;
    Ok(HttpResponse::Ok().json(payload))
}

#[post("/{token}/logs/{log_id}/response")]
async fn respond_extra(
    service: Data<JobService>,
    path: Path<(String, Uuid)>,
    payload: Json<RespondExtra>,
) -> Result<HttpResponse, ServiceError> {
    let (token, log_id) = path.into_inner();
    let result = service
        .respond_extra(&token, log_id, &payload.decision)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn tracking_config(config: &mut ServiceConfig) {
    config.service(
        scope("track")
            .service(public_tracking)
            .service(respond_extra),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_must_not_be_empty() {
        let payload = RespondExtra {
            decision: "".into(),
        };
        assert!(payload.validate().is_err());

        let payload = RespondExtra {
            decision: "approved".into(),
        };
        assert!(payload.validate().is_ok());
    }
}
