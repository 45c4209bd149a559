//! Credit application intake and approval lifecycle.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod validation;

pub use domain::{
    ApplicationDocument, CreditApplication, CreditApplicationDraft, CreditApplicationId,
    CreditApplicationStatus, EmergencyContact, EmploymentInfo, FinancialInfo, PersonalInfo,
};
pub use repository::CreditApplicationRepository;
pub use service::{CreditApplicationService, CreditServiceError};
pub use validation::validate_draft;
