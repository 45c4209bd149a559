use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for published listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

/// Identifier of a marketplace account (seller, sales agent, applicant).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Publication state. Changed by sales and moderation, never by ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
    Reserved,
    Inactive,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Reserved => "reserved",
            ListingStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "sold" => Some(Self::Sold),
            "reserved" => Some(Self::Reserved),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Vehicle listing as materialized from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub user_id: UserId,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub price: u64,
    pub mileage: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub status: ListingStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    pub created_at: DateTime<Utc>,
}
