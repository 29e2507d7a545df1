//! Job posting entity and its vocabulary enums.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hireboard_core::{DomainError, DomainResult, JobId, UserId};
use hireboard_identity::UserProfile;

macro_rules! wire_enum {
    ($t:ident, $label:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $t {
            $($variant,)+
        }

        impl $t {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(DomainError::validation(format!(
                        concat!("unknown ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

wire_enum!(JobType, "job type", {
    FullTime => "FULL_TIME",
    PartTime => "PART_TIME",
    Contract => "CONTRACT",
    Freelance => "FREELANCE",
    Internship => "INTERNSHIP",
});

wire_enum!(JobCategory, "job category", {
    SoftwareDevelopment => "SOFTWARE_DEVELOPMENT",
    DataScience => "DATA_SCIENCE",
    Design => "DESIGN",
    Marketing => "MARKETING",
    Sales => "SALES",
    Finance => "FINANCE",
    HumanResources => "HUMAN_RESOURCES",
    CustomerService => "CUSTOMER_SERVICE",
    Operations => "OPERATIONS",
    Other => "OTHER",
});

wire_enum!(ExperienceLevel, "experience level", {
    EntryLevel => "ENTRY_LEVEL",
    MidLevel => "MID_LEVEL",
    SeniorLevel => "SENIOR_LEVEL",
    Lead => "LEAD",
    Executive => "EXECUTIVE",
});

/// Employer-supplied fields of a posting; everything the server does not
/// assign itself. Doubles as the create/update request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub job_type: JobType,
    pub category: JobCategory,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub skills_required: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
}

impl JobDraft {
    /// Field-level validation; runs before any store write.
    pub fn validate(&self) -> DomainResult<()> {
        let title_len = self.title.trim().chars().count();
        if !(3..=200).contains(&title_len) {
            return Err(DomainError::validation(
                "title must be between 3 and 200 characters",
            ));
        }

        let description_len = self.description.trim().chars().count();
        if !(50..=5000).contains(&description_len) {
            return Err(DomainError::validation(
                "description must be between 50 and 5000 characters",
            ));
        }

        if self.company_name.trim().is_empty() {
            return Err(DomainError::validation("company name is required"));
        }

        if self.location.trim().is_empty() {
            return Err(DomainError::validation("location is required"));
        }

        if let Some(min) = self.salary_min {
            if min <= 0.0 {
                return Err(DomainError::validation("minimum salary must be positive"));
            }
        }
        if let Some(max) = self.salary_max {
            if max <= 0.0 {
                return Err(DomainError::validation("maximum salary must be positive"));
            }
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(DomainError::validation(
                    "minimum salary cannot be greater than maximum salary",
                ));
            }
        }

        Ok(())
    }
}

/// A posted position.
///
/// The poster's identity fields are a snapshot frozen at creation time, not
/// a live reference into the identity service. A job is never hard-deleted:
/// delete is the irreversible transition `is_active: true -> false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub job_type: JobType,
    pub category: JobCategory,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub skills_required: Option<String>,
    pub posted_by_user_id: UserId,
    pub posted_by_username: String,
    pub posted_by_email: String,
    pub is_active: bool,
    pub application_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Materialize a new posting from a validated draft, freezing the
    /// poster's identity.
    pub fn from_draft(draft: JobDraft, poster: &UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            title: draft.title,
            description: draft.description,
            company_name: draft.company_name,
            location: draft.location,
            job_type: draft.job_type,
            category: draft.category,
            experience_level: draft.experience_level,
            salary_min: draft.salary_min,
            salary_max: draft.salary_max,
            skills_required: draft.skills_required,
            posted_by_user_id: poster.id,
            posted_by_username: poster.username.clone(),
            posted_by_email: poster.email.clone(),
            is_active: true,
            application_deadline: draft.application_deadline,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the employer-editable fields. Identity snapshot, activity
    /// flag, and `created_at` are untouched.
    pub fn apply_update(&mut self, draft: JobDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.company_name = draft.company_name;
        self.location = draft.location;
        self.job_type = draft.job_type;
        self.category = draft.category;
        self.experience_level = draft.experience_level;
        self.salary_min = draft.salary_min;
        self.salary_max = draft.salary_max;
        self.skills_required = draft.skills_required;
        self.application_deadline = draft.application_deadline;
        self.touch();
    }

    /// Soft delete. Monotonic: there is no way back to active.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn is_posted_by(&self, user: UserId) -> bool {
        self.posted_by_user_id == user
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hireboard_identity::Role;

    pub(crate) fn employer_profile() -> UserProfile {
        UserProfile {
            id: UserId::new(),
            username: "initech-hr".into(),
            email: "hr@initech.example".into(),
            role: Role::Employer,
        }
    }

    pub(crate) fn valid_draft() -> JobDraft {
        JobDraft {
            title: "Backend Engineer".into(),
            description: "Build and operate the services behind our hiring platform, \
                          from API design to production support."
                .into(),
            company_name: "Initech".into(),
            location: "Austin, TX".into(),
            job_type: JobType::FullTime,
            category: JobCategory::SoftwareDevelopment,
            experience_level: ExperienceLevel::MidLevel,
            salary_min: Some(90_000.0),
            salary_max: Some(120_000.0),
            skills_required: Some("rust, sql".into()),
            application_deadline: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn inverted_salary_range_is_rejected() {
        let draft = JobDraft {
            salary_min: Some(50_000.0),
            salary_max: Some(40_000.0),
            ..valid_draft()
        };
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn single_sided_salary_is_fine() {
        let draft = JobDraft {
            salary_min: Some(50_000.0),
            salary_max: None,
            ..valid_draft()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn short_title_is_rejected() {
        let draft = JobDraft {
            title: "ab".into(),
            ..valid_draft()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn short_description_is_rejected() {
        let draft = JobDraft {
            description: "too short".into(),
            ..valid_draft()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn from_draft_freezes_poster_snapshot_and_activates() {
        let poster = employer_profile();
        let job = Job::from_draft(valid_draft(), &poster);

        assert!(job.is_active);
        assert_eq!(job.posted_by_user_id, poster.id);
        assert_eq!(job.posted_by_email, "hr@initech.example");
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn deactivate_is_one_way() {
        let mut job = Job::from_draft(valid_draft(), &employer_profile());
        job.deactivate();
        assert!(!job.is_active);
        job.deactivate();
        assert!(!job.is_active);
    }

    #[test]
    fn enums_parse_their_wire_names() {
        assert_eq!("FULL_TIME".parse::<JobType>().unwrap(), JobType::FullTime);
        assert_eq!(
            "SOFTWARE_DEVELOPMENT".parse::<JobCategory>().unwrap(),
            JobCategory::SoftwareDevelopment
        );
        assert!("PERM".parse::<JobType>().is_err());
        assert_eq!(JobCategory::DataScience.as_str(), "DATA_SCIENCE");
    }
}
