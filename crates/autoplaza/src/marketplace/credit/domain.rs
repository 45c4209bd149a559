use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::lifecycle::StatusOverride;
use crate::marketplace::listings::{ListingId, UserId};

/// Identifier wrapper for credit applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditApplicationId(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentInfo {
    pub employer: Option<String>,
    pub position: Option<String>,
    pub months_employed: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialInfo {
    pub monthly_income: u64,
    pub monthly_expenses: u64,
    pub requested_amount: Option<u64>,
    pub down_payment: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

/// Uploaded supporting document; the file itself lives in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDocument {
    pub name: String,
    pub kind: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Disbursed,
    Cancelled,
}

impl CreditApplicationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "under_review" => Some(Self::UnderReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "disbursed" => Some(Self::Disbursed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Applicant input before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditApplicationDraft {
    pub user_id: UserId,
    pub personal_info: PersonalInfo,
    pub employment_info: EmploymentInfo,
    pub financial_info: FinancialInfo,
    pub emergency_contact: EmergencyContact,
    pub listing_id: Option<ListingId>,
    pub documents: Vec<ApplicationDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditApplication {
    pub id: CreditApplicationId,
    pub user_id: UserId,
    pub personal_info: PersonalInfo,
    pub employment_info: EmploymentInfo,
    pub financial_info: FinancialInfo,
    pub emergency_contact: EmergencyContact,
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    #[serde(default)]
    pub documents: Vec<ApplicationDocument>,
    pub status: CreditApplicationStatus,
    #[serde(default)]
    pub status_overrides: Vec<StatusOverride<CreditApplicationStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
