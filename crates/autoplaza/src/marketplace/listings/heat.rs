use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Listing;

/// Popularity class of a listing relative to its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatTier {
    Normal,
    Hot,
    SuperHot,
}

impl HeatTier {
    pub const fn label(self) -> &'static str {
        match self {
            HeatTier::Normal => "normal",
            HeatTier::Hot => "hot",
            HeatTier::SuperHot => "super-hot",
        }
    }
}

/// View threshold applying to listings at most `max_days_old` days old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBand {
    pub max_days_old: i64,
    pub threshold: u64,
}

/// Thresholds behind [`heat_tier`]. Bands are checked in order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatPolicy {
    pub bands: Vec<AgeBand>,
    pub fallback_threshold: u64,
    pub super_hot_multiplier: u64,
}

impl Default for HeatPolicy {
    fn default() -> Self {
        Self {
            bands: vec![
                AgeBand {
                    max_days_old: 1,
                    threshold: 20,
                },
                AgeBand {
                    max_days_old: 7,
                    threshold: 35,
                },
                AgeBand {
                    max_days_old: 30,
                    threshold: 50,
                },
            ],
            fallback_threshold: 100,
            super_hot_multiplier: 2,
        }
    }
}

impl HeatPolicy {
    pub fn threshold_for(&self, days_old: i64) -> u64 {
        self.bands
            .iter()
            .find(|band| days_old <= band.max_days_old)
            .map(|band| band.threshold)
            .unwrap_or(self.fallback_threshold)
    }

    pub fn tier(&self, views: u64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> HeatTier {
        let threshold = self.threshold_for(days_old(created_at, now));
        if views >= threshold.saturating_mul(self.super_hot_multiplier) {
            HeatTier::SuperHot
        } else if views >= threshold {
            HeatTier::Hot
        } else {
            HeatTier::Normal
        }
    }

    pub fn tier_of(&self, listing: &Listing, now: DateTime<Utc>) -> HeatTier {
        self.tier(listing.views_count, listing.created_at, now)
    }
}

/// Whole days elapsed since creation; a creation time in the future counts as day zero.
pub fn days_old(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days().max(0)
}

/// Heat tier under the default thresholds.
pub fn heat_tier(views: u64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> HeatTier {
    HeatPolicy::default().tier(views, created_at, now)
}
