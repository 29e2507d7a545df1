//! Typed event payloads.
//!
//! Events are immutable facts emitted after a successful store write. They
//! are serialized to camelCase JSON for transit; consumers must tolerate
//! unknown fields (serde's default) so payloads can grow.

use serde::{Deserialize, Serialize};

use hireboard_core::{ApplicationId, JobId};

/// Routing keys on the job-board exchange. One durable queue per key.
pub mod routing_keys {
    pub const JOB_POSTED: &str = "job.posted";
    pub const APPLICATION_SUBMITTED: &str = "application.submitted";
    pub const APPLICATION_STATUS_CHANGED: &str = "application.status.changed";
}

/// A job went live. Carries the recipient list resolved at publish time;
/// the consumer never re-resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosted {
    pub job_id: JobId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub category: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub posted_by_username: String,
    pub posted_by_email: String,
    #[serde(default)]
    pub recipient_emails: Vec<String>,
}

/// An applicant submitted an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmitted {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub applicant_username: String,
    pub applicant_email: String,
    pub employer_email: String,
}

/// The job owner moved an application to a new status.
///
/// Statuses travel as strings so consumers keep working when the producer
/// grows new states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusChanged {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub applicant_username: String,
    pub applicant_email: String,
    pub old_status: String,
    pub new_status: String,
}

/// Union of everything the lifecycle services emit.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    JobPosted(JobPosted),
    ApplicationSubmitted(ApplicationSubmitted),
    ApplicationStatusChanged(ApplicationStatusChanged),
}

impl DomainEvent {
    pub fn routing_key(&self) -> &'static str {
        match self {
            DomainEvent::JobPosted(_) => routing_keys::JOB_POSTED,
            DomainEvent::ApplicationSubmitted(_) => routing_keys::APPLICATION_SUBMITTED,
            DomainEvent::ApplicationStatusChanged(_) => routing_keys::APPLICATION_STATUS_CHANGED,
        }
    }

    pub fn payload_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            DomainEvent::JobPosted(e) => serde_json::to_value(e),
            DomainEvent::ApplicationSubmitted(e) => serde_json::to_value(e),
            DomainEvent::ApplicationStatusChanged(e) => serde_json::to_value(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_serialize_camel_case() {
        let event = JobPosted {
            job_id: JobId::new(),
            title: "Backend Engineer".into(),
            company_name: "Initech".into(),
            location: "Remote".into(),
            category: "SOFTWARE_DEVELOPMENT".into(),
            salary_min: Some(90_000.0),
            salary_max: Some(120_000.0),
            posted_by_username: "bill".into(),
            posted_by_email: "bill@initech.example".into(),
            recipient_emails: vec!["a@example.com".into()],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("companyName").is_some());
        assert!(json.get("recipientEmails").is_some());
        assert!(json.get("company_name").is_none());
    }

    #[test]
    fn consumers_ignore_unknown_fields() {
        let json = serde_json::json!({
            "applicationId": uuid::Uuid::now_v7(),
            "jobId": uuid::Uuid::now_v7(),
            "jobTitle": "Backend Engineer",
            "companyName": "Initech",
            "applicantUsername": "peter",
            "applicantEmail": "peter@example.com",
            "employerEmail": "bill@initech.example",
            "someFutureField": {"nested": true},
        });

        let event: ApplicationSubmitted = serde_json::from_value(json).unwrap();
        assert_eq!(event.applicant_username, "peter");
    }

    #[test]
    fn missing_recipient_list_decodes_as_empty() {
        let json = serde_json::json!({
            "jobId": uuid::Uuid::now_v7(),
            "title": "t",
            "companyName": "c",
            "location": "l",
            "category": "OTHER",
            "salaryMin": null,
            "salaryMax": null,
            "postedByUsername": "u",
            "postedByEmail": "u@example.com",
        });

        let event: JobPosted = serde_json::from_value(json).unwrap();
        assert!(event.recipient_emails.is_empty());
    }
}
