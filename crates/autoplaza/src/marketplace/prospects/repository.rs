use super::domain::{Prospect, ProspectFilters, ProspectId};
use crate::marketplace::repository::RepositoryError;

/// Storage contract for prospects.
///
/// Reassignment entries must be persisted append-only; `update` never rewrites
/// entries that are already stored.
pub trait ProspectRepository: Send + Sync {
    fn insert(&self, prospect: Prospect) -> Result<Prospect, RepositoryError>;
    fn find_by_id(&self, id: &ProspectId) -> Result<Option<Prospect>, RepositoryError>;
    fn find_many(&self, filters: &ProspectFilters) -> Result<Vec<Prospect>, RepositoryError>;
    fn update(&self, prospect: Prospect) -> Result<(), RepositoryError>;
}
