use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::api::job::service::ServiceError;

/// Header carrying the authenticated user id, injected by the auth gateway
/// after it has verified the session token.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user identity required by mutating endpoints.
///
/// Extracted explicitly per request instead of read from ambient session
/// state, so the missing-session failure path is deterministic: extraction
/// fails with 401 before any handler or insert runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl FromRequest for CurrentUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(CurrentUser);

        ready(user.ok_or(ServiceError::Unauthorized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn missing_header_fails_with_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let res = CurrentUser::extract(&req).await;
        assert!(matches!(res, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn malformed_user_id_fails_with_unauthorized() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        let res = CurrentUser::extract(&req).await;
        assert!(matches!(res, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn valid_user_id_is_extracted() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        let user = CurrentUser::extract(&req).await.unwrap();
        assert_eq!(user, CurrentUser(id));
    }
}
