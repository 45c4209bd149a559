//! Listing discovery: heat scoring, filtering, and feed ordering.

pub mod domain;
pub mod heat;
pub mod ranking;
pub mod repository;
pub mod service;

pub use domain::{Listing, ListingId, ListingStatus, UserId};
pub use heat::{days_old, heat_tier, AgeBand, HeatPolicy, HeatTier};
pub use ranking::{find_featured, find_similar, rank, ListingFilters, Page, SortBy};
pub use repository::ListingRepository;
pub use service::{ListingFeedService, ListingServiceError};
