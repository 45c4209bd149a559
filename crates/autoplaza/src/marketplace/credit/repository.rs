use super::domain::{CreditApplication, CreditApplicationId};
use crate::marketplace::repository::RepositoryError;

/// Storage contract for credit applications.
///
/// `update` is expected to apply the new status atomically against the stored one.
pub trait CreditApplicationRepository: Send + Sync {
    fn insert(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError>;
    fn find_by_id(
        &self,
        id: &CreditApplicationId,
    ) -> Result<Option<CreditApplication>, RepositoryError>;
    fn update(&self, application: CreditApplication) -> Result<(), RepositoryError>;
}
