use super::domain::{Listing, ListingId, UserId};
use super::ranking::ListingFilters;
use crate::marketplace::repository::RepositoryError;

/// Storage contract for listings.
///
/// `increment_views` belongs to the view-tracking path; ranking only ever reads.
pub trait ListingRepository: Send + Sync {
    fn find_many(&self, filters: &ListingFilters) -> Result<Vec<Listing>, RepositoryError>;
    fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError>;
    fn increment_views(&self, id: &ListingId) -> Result<u64, RepositoryError>;
}
