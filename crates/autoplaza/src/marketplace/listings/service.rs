use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{Listing, ListingId, UserId};
use super::heat::{HeatPolicy, HeatTier};
use super::ranking::{self, ListingFilters, Page, SortBy};
use super::repository::ListingRepository;
use crate::marketplace::repository::RepositoryError;

/// Read-side feed over a listing repository.
pub struct ListingFeedService<R> {
    repository: Arc<R>,
    policy: HeatPolicy,
}

impl<R> ListingFeedService<R>
where
    R: ListingRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: HeatPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &HeatPolicy {
        &self.policy
    }

    pub fn heat_of(&self, listing: &Listing, now: DateTime<Utc>) -> HeatTier {
        self.policy.tier_of(listing, now)
    }

    /// Filtered, ordered and paginated feed.
    pub fn search(
        &self,
        filters: &ListingFilters,
        sort_by: SortBy,
        page: Page,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let candidates = self.repository.find_many(filters)?;
        let ranked = ranking::rank(candidates, filters, sort_by, &self.policy, now);
        Ok(page.apply(ranked))
    }

    pub fn featured(&self, limit: Option<usize>) -> Result<Vec<Listing>, ListingServiceError> {
        let filters = ListingFilters {
            is_featured: Some(true),
            ..ListingFilters::default()
        };
        let candidates = self.repository.find_many(&filters)?;
        Ok(ranking::find_featured(candidates, limit))
    }

    pub fn similar(
        &self,
        listing_id: &ListingId,
        limit: Option<usize>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let reference = self
            .repository
            .find_by_id(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        let filters = ListingFilters {
            brand: Some(reference.brand.clone()),
            ..ListingFilters::default()
        };
        let candidates = self.repository.find_many(&filters)?;
        Ok(ranking::find_similar(candidates, &reference, limit))
    }

    pub fn by_owner(
        &self,
        user_id: &UserId,
        sort_by: SortBy,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let candidates = self.repository.find_by_user_id(user_id)?;
        let filters = ListingFilters {
            user_id: Some(user_id.clone()),
            ..ListingFilters::default()
        };
        Ok(ranking::rank(
            candidates,
            &filters,
            sort_by,
            &self.policy,
            now,
        ))
    }
}

/// Error raised by the listing feed.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
