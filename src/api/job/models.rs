use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for creating a job.
///
/// The assignee is never part of the payload: it is stamped from the
/// authenticated user on the server side.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct NewJob {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Customer name must be between 1 and 200 characters"
    ))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub intake_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 40, message = "Status code is required"))]
    pub status: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub share_public: bool,
}

/// Partial update of a job. Absent fields are left untouched.
///
/// `assigned_to` and `public_token` are deliberately not patchable through
/// this surface; both are managed server-side.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct JobPatch {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Customer name must be between 1 and 200 characters"
    ))]
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub intake_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 40, message = "Status code must not be empty"))]
    pub status: Option<String>,
    pub notes: Option<String>,
    pub share_public: Option<bool>,
}

/// Payload for appending a log entry to a job.
#[derive(Debug, Deserialize, Validate)]
pub struct NewLog {
    #[validate(length(min = 1, message = "Message must not be empty"))]
    pub message: String,
    pub status: Option<String>,
    #[validate(url(message = "Attachment must be a valid URL"))]
    pub attachment_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_requires_title_and_customer_name() {
        let job = NewJob {
            title: "".into(),
            customer_name: "Ada".into(),
            customer_phone: None,
            device_type: None,
            brand: None,
            model: None,
            serial: None,
            intake_date: None,
            status: "received".into(),
            notes: None,
            share_public: false,
        };
        let errors = job.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn new_log_rejects_malformed_attachment_urls() {
        let log = NewLog {
            message: "screen replaced".into(),
            status: None,
            attachment_url: Some("not a url".into()),
        };
        assert!(log.validate().is_err());

        let log = NewLog {
            message: "screen replaced".into(),
            status: Some("in_progress".into()),
            attachment_url: Some("https://cdn.example.com/job-attachments/a/b.jpg".into()),
        };
        assert!(log.validate().is_ok());
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(JobPatch::default().validate().is_ok());
    }
}
