use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Listing, ListingStatus, UserId};
use super::heat::HeatPolicy;

/// Conjunction of optional predicates; an absent field imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingFilters {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year_min: Option<u16>,
    pub year_max: Option<u16>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
    pub status: Option<ListingStatus>,
    pub is_featured: Option<bool>,
    pub user_id: Option<UserId>,
}

impl ListingFilters {
    pub fn matches(&self, listing: &Listing) -> bool {
        text_matches(&self.brand, Some(&listing.brand))
            && text_matches(&self.model, Some(&listing.model))
            && self.year_min.map_or(true, |min| listing.year >= min)
            && self.year_max.map_or(true, |max| listing.year <= max)
            && self.price_min.map_or(true, |min| listing.price >= min)
            && self.price_max.map_or(true, |max| listing.price <= max)
            && text_matches(&self.fuel_type, Some(&listing.fuel_type))
            && text_matches(&self.transmission, Some(&listing.transmission))
            && text_matches(&self.body_type, Some(&listing.body_type))
            && text_matches(&self.color, listing.color.as_ref())
            && text_matches(&self.city, listing.city.as_ref())
            && self.status.map_or(true, |status| listing.status == status)
            && self
                .is_featured
                .map_or(true, |featured| listing.is_featured == featured)
            && self
                .user_id
                .as_ref()
                .map_or(true, |user| &listing.user_id == user)
    }
}

fn text_matches(wanted: &Option<String>, actual: Option<&String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual
            .map(|actual| actual.trim().eq_ignore_ascii_case(wanted.trim()))
            .unwrap_or(false),
    }
}

/// Feed ordering strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Recent,
    PriceLow,
    PriceHigh,
    Popular,
    Views,
}

impl SortBy {
    pub const fn label(self) -> &'static str {
        match self {
            SortBy::Recent => "recent",
            SortBy::PriceLow => "price_low",
            SortBy::PriceHigh => "price_high",
            SortBy::Popular => "popular",
            SortBy::Views => "views",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "price_low" => Ok(Self::PriceLow),
            "price_high" => Ok(Self::PriceHigh),
            "popular" => Ok(Self::Popular),
            "views" => Ok(Self::Views),
            other => Err(format!(
                "unknown sort '{other}' (expected recent, price_low, price_high, popular or views)"
            )),
        }
    }
}

/// Filter then order `candidates`. The sort is stable, so listings with equal keys keep
/// their input order and repeated queries paginate identically.
pub fn rank(
    candidates: Vec<Listing>,
    filters: &ListingFilters,
    sort_by: SortBy,
    policy: &HeatPolicy,
    now: DateTime<Utc>,
) -> Vec<Listing> {
    let mut ranked: Vec<Listing> = candidates
        .into_iter()
        .filter(|listing| filters.matches(listing))
        .collect();
    sort_listings(&mut ranked, sort_by, policy, now);
    ranked
}

fn sort_listings(
    listings: &mut [Listing],
    sort_by: SortBy,
    policy: &HeatPolicy,
    now: DateTime<Utc>,
) {
    match sort_by {
        SortBy::Recent => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::PriceLow => listings.sort_by_key(|listing| listing.price),
        SortBy::PriceHigh => listings.sort_by(|a, b| b.price.cmp(&a.price)),
        SortBy::Views => listings.sort_by(|a, b| b.views_count.cmp(&a.views_count)),
        SortBy::Popular => listings.sort_by(|a, b| popularity(a, b, policy, now)),
    }
}

fn popularity(a: &Listing, b: &Listing, policy: &HeatPolicy, now: DateTime<Utc>) -> Ordering {
    b.likes_count
        .cmp(&a.likes_count)
        .then_with(|| policy.tier_of(b, now).cmp(&policy.tier_of(a, now)))
        .then_with(|| b.views_count.cmp(&a.views_count))
}

/// Featured listings, newest first.
pub fn find_featured(candidates: Vec<Listing>, limit: Option<usize>) -> Vec<Listing> {
    let filters = ListingFilters {
        is_featured: Some(true),
        ..ListingFilters::default()
    };
    let mut featured: Vec<Listing> = candidates
        .into_iter()
        .filter(|listing| filters.matches(listing))
        .collect();
    featured.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    truncate(featured, limit)
}

/// Same brand, price within 20% of the reference (inclusive), reference excluded, newest first.
pub fn find_similar(
    candidates: Vec<Listing>,
    reference: &Listing,
    limit: Option<usize>,
) -> Vec<Listing> {
    let window = reference.price as f64 * 0.2;
    let mut similar: Vec<Listing> = candidates
        .into_iter()
        .filter(|listing| listing.id != reference.id)
        .filter(|listing| {
            listing
                .brand
                .trim()
                .eq_ignore_ascii_case(reference.brand.trim())
        })
        .filter(|listing| (listing.price as f64 - reference.price as f64).abs() <= window)
        .collect();
    similar.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    truncate(similar, limit)
}

fn truncate(mut listings: Vec<Listing>, limit: Option<usize>) -> Vec<Listing> {
    if let Some(limit) = limit {
        listings.truncate(limit);
    }
    listings
}

const MAX_PER_PAGE: usize = 100;

/// One-based page window over an already ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Page {
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let offset = self.page.max(1).saturating_sub(1).saturating_mul(per_page);
        items.into_iter().skip(offset).take(per_page).collect()
    }
}
