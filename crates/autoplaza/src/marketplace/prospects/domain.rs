use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::lifecycle::StatusOverride;
use crate::marketplace::listings::{ListingId, UserId};

/// Identifier wrapper for prospects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProspectId(pub String);

/// Acquisition channel of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectSource {
    Website,
    Whatsapp,
    Referral,
    Phone,
    WalkIn,
    SocialMedia,
    Marketplace,
    Other,
}

impl ProspectSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Whatsapp => "whatsapp",
            Self::Referral => "referral",
            Self::Phone => "phone",
            Self::WalkIn => "walk_in",
            Self::SocialMedia => "social_media",
            Self::Marketplace => "marketplace",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "website" => Some(Self::Website),
            "whatsapp" => Some(Self::Whatsapp),
            "referral" => Some(Self::Referral),
            "phone" => Some(Self::Phone),
            "walk_in" => Some(Self::WalkIn),
            "social_media" => Some(Self::SocialMedia),
            "marketplace" => Some(Self::Marketplace),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Channels where the lead reached out directly.
    pub const fn is_high_intent(self) -> bool {
        matches!(self, Self::Whatsapp | Self::Referral)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectStatus {
    New,
    Contacted,
    Qualified,
    Negotiating,
    Won,
    Lost,
    Discarded,
}

impl ProspectStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "negotiating" => Some(Self::Negotiating),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            "discarded" => Some(Self::Discarded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    /// When the appointment was booked; counts as activity.
    pub scheduled_at: DateTime<Utc>,
}

/// One ownership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentEntry {
    pub from: UserId,
    pub to: UserId,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Append-only log of ownership changes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReassignmentHistory(Vec<ReassignmentEntry>);

impl ReassignmentHistory {
    pub fn entries(&self) -> &[ReassignmentEntry] {
        &self.0
    }

    pub fn last(&self) -> Option<&ReassignmentEntry> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn append(&mut self, entry: ReassignmentEntry) {
        self.0.push(entry);
    }
}

/// Sales lead.
///
/// The current owner is not stored: [`Prospect::assigned_to`] reads it off the last
/// reassignment, falling back to `created_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub id: ProspectId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub source: ProspectSource,
    pub status: ProspectStatus,
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub appointment: Option<Appointment>,
    pub created_by: UserId,
    #[serde(default)]
    pub reassignment_history: ReassignmentHistory,
    #[serde(default)]
    pub status_overrides: Vec<StatusOverride<ProspectStatus>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl Prospect {
    pub fn assigned_to(&self) -> &UserId {
        self.reassignment_history
            .last()
            .map(|entry| &entry.to)
            .unwrap_or(&self.created_by)
    }
}

/// Raw intake payload; `source` is checked against the known channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProspectDraft {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub source: String,
    pub listing_id: Option<ListingId>,
    pub budget: Option<Budget>,
    pub message: Option<String>,
    pub tags: Vec<String>,
    pub created_by: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProspectFilters {
    pub status: Option<ProspectStatus>,
    pub source: Option<ProspectSource>,
    pub assigned_to: Option<UserId>,
    pub listing_id: Option<ListingId>,
    pub tag: Option<String>,
}

impl ProspectFilters {
    pub fn matches(&self, prospect: &Prospect) -> bool {
        self.status.map_or(true, |status| prospect.status == status)
            && self.source.map_or(true, |source| prospect.source == source)
            && self
                .assigned_to
                .as_ref()
                .map_or(true, |owner| prospect.assigned_to() == owner)
            && self
                .listing_id
                .as_ref()
                .map_or(true, |listing| prospect.listing_id.as_ref() == Some(listing))
            && self
                .tag
                .as_ref()
                .map_or(true, |tag| prospect.tags.contains(tag.trim()))
    }
}
