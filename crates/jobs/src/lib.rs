//! `hireboard-jobs` — job store and lifecycle services.
//!
//! Owns the `Job` and `JobApplication` entities, their query surface, and
//! the two services that orchestrate mutations: [`JobService`] for postings
//! and [`ApplicationService`] for the application state machine. Both write
//! through an injected store, resolve callers through the identity
//! collaborator, and emit events best-effort after a successful commit.

mod access;
pub mod application;
pub mod applications;
pub mod job;
pub mod lifecycle;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod store;

pub use application::{ApplicationDraft, ApplicationStatus, JobApplication};
pub use applications::{ApplicationRecord, ApplicationService};
pub use job::{ExperienceLevel, Job, JobCategory, JobDraft, JobType};
pub use lifecycle::JobService;
pub use store::{ApplicationStore, InMemoryApplicationStore, InMemoryJobStore, JobStore, StoreError};
