//! Job application entity and status machine.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hireboard_core::{ApplicationId, DomainError, DomainResult, JobId, UserId};
use hireboard_identity::UserProfile;

/// Application lifecycle states.
///
/// `Pending` is the only initial state. The job owner may move an
/// application between any of the review states; `Withdrawn` is reserved
/// for the applicant and, once set, blocks further owner transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Interviewed,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::Shortlisted => "SHORTLISTED",
            Self::Interviewed => "INTERVIEWED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        matches!(self, Self::Withdrawn)
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "REVIEWED" => Ok(Self::Reviewed),
            "SHORTLISTED" => Ok(Self::Shortlisted),
            "INTERVIEWED" => Ok(Self::Interviewed),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "WITHDRAWN" => Ok(Self::Withdrawn),
            other => Err(DomainError::validation(format!(
                "unknown application status: {other}"
            ))),
        }
    }
}

/// Applicant-supplied fields; doubles as the apply request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub cover_letter: String,
    pub resume_url: Option<String>,
}

pub const COVER_LETTER_MIN: usize = 50;
pub const COVER_LETTER_MAX: usize = 2000;

impl ApplicationDraft {
    /// Checked before identity resolution or any store access.
    pub fn validate(&self) -> DomainResult<()> {
        let len = self.cover_letter.chars().count();
        if !(COVER_LETTER_MIN..=COVER_LETTER_MAX).contains(&len) {
            return Err(DomainError::validation(format!(
                "cover letter must be between {COVER_LETTER_MIN} and {COVER_LETTER_MAX} characters"
            )));
        }
        Ok(())
    }
}

/// One applicant's submission against one job.
///
/// `(job_id, user_id)` is unique; the store enforces it. The applicant's
/// identity fields are a snapshot taken at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub username: String,
    pub user_email: String,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn new(job_id: JobId, applicant: &UserProfile, draft: ApplicationDraft) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::new(),
            job_id,
            user_id: applicant.id,
            username: applicant.username.clone(),
            user_email: applicant.email.clone(),
            cover_letter: draft.cover_letter,
            resume_url: draft.resume_url,
            status: ApplicationStatus::Pending,
            applied_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: ApplicationStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hireboard_identity::Role;
    use proptest::prelude::*;

    pub(crate) fn seeker_profile() -> UserProfile {
        UserProfile {
            id: UserId::new(),
            username: "peter".into(),
            email: "peter@example.com".into(),
            role: Role::User,
        }
    }

    pub(crate) fn draft_with_letter_len(len: usize) -> ApplicationDraft {
        ApplicationDraft {
            cover_letter: "x".repeat(len),
            resume_url: None,
        }
    }

    #[test]
    fn cover_letter_boundaries() {
        assert!(draft_with_letter_len(49).validate().is_err());
        assert!(draft_with_letter_len(50).validate().is_ok());
        assert!(draft_with_letter_len(2000).validate().is_ok());
        assert!(draft_with_letter_len(2001).validate().is_err());
    }

    #[test]
    fn new_application_starts_pending() {
        let application = JobApplication::new(
            JobId::new(),
            &seeker_profile(),
            draft_with_letter_len(100),
        );
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.applied_at, application.updated_at);
    }

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewed,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interviewed,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!("ON_HOLD".parse::<ApplicationStatus>().is_err());
    }

    proptest! {
        #[test]
        fn cover_letter_valid_exactly_within_bounds(len in 0usize..3000) {
            let outcome = draft_with_letter_len(len).validate();
            prop_assert_eq!(
                outcome.is_ok(),
                (COVER_LETTER_MIN..=COVER_LETTER_MAX).contains(&len)
            );
        }
    }
}
