//! Sales-lead lifecycle: intake, ownership, appointments, and follow-up queues.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod scoring;
pub mod service;
pub mod validation;

pub use domain::{
    Appointment, Budget, Prospect, ProspectDraft, ProspectFilters, ProspectId, ProspectSource,
    ProspectStatus, ReassignmentEntry, ReassignmentHistory,
};
pub use lifecycle::ProspectError;
pub use repository::ProspectRepository;
pub use scoring::{is_hot, is_stale, last_activity, ProspectWindows};
pub use service::{ProspectQueues, ProspectService, ProspectServiceError};
pub use validation::validate_draft;
