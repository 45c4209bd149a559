use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    CreditApplication, CreditApplicationDraft, CreditApplicationId, CreditApplicationStatus,
};
use super::repository::CreditApplicationRepository;
use super::validation::validate_draft;
use crate::marketplace::lifecycle::InvalidTransition;
use crate::marketplace::listings::UserId;
use crate::marketplace::repository::RepositoryError;
use crate::marketplace::validation::ValidationError;

/// Service applying intake validation and lifecycle rules over the repository.
pub struct CreditApplicationService<R> {
    repository: Arc<R>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> CreditApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CreditApplicationId(format!("cred-{id:06}"))
}

impl<R> CreditApplicationService<R>
where
    R: CreditApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and store a new application in `pending`.
    pub fn submit(
        &self,
        draft: CreditApplicationDraft,
        now: DateTime<Utc>,
    ) -> Result<CreditApplication, CreditServiceError> {
        validate_draft(&draft)?;

        let application = CreditApplication {
            id: next_application_id(),
            user_id: draft.user_id,
            personal_info: draft.personal_info,
            employment_info: draft.employment_info,
            financial_info: draft.financial_info,
            emergency_contact: draft.emergency_contact,
            listing_id: draft.listing_id,
            documents: draft.documents,
            status: CreditApplicationStatus::Pending,
            status_overrides: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        Ok(self.repository.insert(application)?)
    }

    pub fn get(&self, id: &CreditApplicationId) -> Result<CreditApplication, CreditServiceError> {
        Ok(self
            .repository
            .find_by_id(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn transition(
        &self,
        id: &CreditApplicationId,
        next: CreditApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<CreditApplication, CreditServiceError> {
        let mut application = self.get(id)?;
        application.transition_to(next, now)?;
        self.repository.update(application.clone())?;
        Ok(application)
    }

    pub fn cancel(
        &self,
        id: &CreditApplicationId,
        now: DateTime<Utc>,
    ) -> Result<CreditApplication, CreditServiceError> {
        self.transition(id, CreditApplicationStatus::Cancelled, now)
    }

    pub fn override_status(
        &self,
        id: &CreditApplicationId,
        next: CreditApplicationStatus,
        actor: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<CreditApplication, CreditServiceError> {
        let mut application = self.get(id)?;
        application.override_status(next, actor, reason, now)?;
        self.repository.update(application.clone())?;
        Ok(application)
    }
}

/// Error raised by the credit application service.
#[derive(Debug, thiserror::Error)]
pub enum CreditServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
