use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::marketplace::credit::{
    CreditApplication, CreditApplicationDraft, CreditApplicationId, CreditApplicationRepository,
    EmergencyContact, EmploymentInfo, FinancialInfo, PersonalInfo,
};
use crate::marketplace::financing::{
    BankPartner, BankPartnerId, BankPartnerRepository, Incident, IncidentSeverity,
};
use crate::marketplace::listings::{
    Listing, ListingFilters, ListingId, ListingRepository, ListingStatus, UserId,
};
use crate::marketplace::prospects::{
    Prospect, ProspectDraft, ProspectFilters, ProspectId, ProspectRepository,
};
use crate::marketplace::repository::RepositoryError;
use crate::marketplace::router::{MarketplaceRepositories, MarketplaceServices};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

pub(super) fn listing(id: &str, brand: &str, price: u64, created_at: DateTime<Utc>) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        user_id: user("seller-1"),
        brand: brand.to_string(),
        model: "Sedan".to_string(),
        year: 2019,
        price,
        mileage: 48_000,
        fuel_type: "gasoline".to_string(),
        transmission: "automatic".to_string(),
        body_type: "sedan".to_string(),
        color: Some("white".to_string()),
        city: Some("Guadalajara".to_string()),
        status: ListingStatus::Active,
        is_featured: false,
        views_count: 0,
        likes_count: 0,
        created_at,
    }
}

pub(super) fn partner(id: &str, name: &str, credit_rate: f64, processing_time: u16) -> BankPartner {
    BankPartner {
        id: BankPartnerId(id.to_string()),
        name: name.to_string(),
        credit_rate,
        min_term: 12,
        max_term: 60,
        min_vehicle_year: None,
        requirements: BTreeSet::from(["INE".to_string(), "proof of income".to_string()]),
        processing_time,
        is_active: true,
        incidents: Vec::new(),
    }
}

pub(super) fn incident(resolved: bool, reported_at: DateTime<Utc>) -> Incident {
    Incident {
        kind: "late_disbursement".to_string(),
        severity: IncidentSeverity::Media,
        description: Some("Funds released after the promised date".to_string()),
        reported_at,
        resolved,
    }
}

pub(super) fn credit_draft() -> CreditApplicationDraft {
    CreditApplicationDraft {
        user_id: user("buyer-7"),
        personal_info: PersonalInfo {
            name: "Ana Pérez".to_string(),
            phone: Some("+52 33 1234 5678".to_string()),
            email: Some("ana.perez@example.mx".to_string()),
            ..PersonalInfo::default()
        },
        employment_info: EmploymentInfo {
            employer: Some("Taller Hernández".to_string()),
            position: Some("Mechanic".to_string()),
            months_employed: Some(30),
        },
        financial_info: FinancialInfo {
            monthly_income: 28_000,
            monthly_expenses: 9_500,
            requested_amount: Some(200_000),
            down_payment: Some(40_000),
        },
        emergency_contact: EmergencyContact {
            name: "Luis Pérez".to_string(),
            phone: "+52 33 8765 4321".to_string(),
            relationship: Some("brother".to_string()),
        },
        listing_id: Some(ListingId("lst-1".to_string())),
        documents: Vec::new(),
    }
}

pub(super) fn prospect_draft(source: &str) -> ProspectDraft {
    ProspectDraft {
        name: "Carlos Ruiz".to_string(),
        phone: "3312345678".to_string(),
        email: None,
        source: source.to_string(),
        listing_id: Some(ListingId("lst-1".to_string())),
        budget: None,
        message: Some("Is the car still available?".to_string()),
        tags: vec!["first-car".to_string()],
        created_by: user("agent-a"),
    }
}

pub(super) fn prospect(source: &str, created_at: DateTime<Utc>) -> Prospect {
    Prospect::create(
        ProspectId("lead-test".to_string()),
        prospect_draft(source),
        created_at,
    )
    .expect("valid prospect draft")
}

#[derive(Default, Clone)]
pub(super) struct MemoryListings {
    pub(super) records: Arc<Mutex<Vec<Listing>>>,
}

impl MemoryListings {
    pub(super) fn with(listings: Vec<Listing>) -> Self {
        Self {
            records: Arc::new(Mutex::new(listings)),
        }
    }
}

impl ListingRepository for MemoryListings {
    fn find_many(&self, filters: &ListingFilters) -> Result<Vec<Listing>, RepositoryError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard
            .iter()
            .filter(|listing| filters.matches(listing))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard.iter().find(|listing| &listing.id == id).cloned())
    }

    fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError> {
        let guard = self.records.lock().expect("listing mutex poisoned");
        Ok(guard
            .iter()
            .filter(|listing| &listing.user_id == user_id)
            .cloned()
            .collect())
    }

    fn increment_views(&self, id: &ListingId) -> Result<u64, RepositoryError> {
        let mut guard = self.records.lock().expect("listing mutex poisoned");
        let listing = guard
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(RepositoryError::NotFound)?;
        listing.views_count += 1;
        Ok(listing.views_count)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPartners {
    pub(super) records: Arc<Mutex<Vec<BankPartner>>>,
}

impl MemoryPartners {
    pub(super) fn with(partners: Vec<BankPartner>) -> Self {
        Self {
            records: Arc::new(Mutex::new(partners)),
        }
    }
}

impl BankPartnerRepository for MemoryPartners {
    fn find_active_for_simulator(&self) -> Result<Vec<BankPartner>, RepositoryError> {
        let guard = self.records.lock().expect("partner mutex poisoned");
        Ok(guard.iter().filter(|partner| partner.is_active).cloned().collect())
    }

    fn find_active_for_vehicle_year(
        &self,
        year: u16,
    ) -> Result<Vec<BankPartner>, RepositoryError> {
        let guard = self.records.lock().expect("partner mutex poisoned");
        Ok(guard
            .iter()
            .filter(|partner| partner.is_active)
            .filter(|partner| partner.min_vehicle_year.map_or(true, |min| year >= min))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &BankPartnerId) -> Result<Option<BankPartner>, RepositoryError> {
        let guard = self.records.lock().expect("partner mutex poisoned");
        Ok(guard.iter().find(|partner| &partner.id == id).cloned())
    }

    fn update(&self, partner: BankPartner) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("partner mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == partner.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = partner;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCredit {
    pub(super) records: Arc<Mutex<HashMap<CreditApplicationId, CreditApplication>>>,
}

impl CreditApplicationRepository for MemoryCredit {
    fn insert(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("credit mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn find_by_id(
        &self,
        id: &CreditApplicationId,
    ) -> Result<Option<CreditApplication>, RepositoryError> {
        let guard = self.records.lock().expect("credit mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, application: CreditApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("credit mutex poisoned");
        guard.insert(application.id.clone(), application);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryProspects {
    pub(super) records: Arc<Mutex<Vec<Prospect>>>,
}

impl ProspectRepository for MemoryProspects {
    fn insert(&self, prospect: Prospect) -> Result<Prospect, RepositoryError> {
        let mut guard = self.records.lock().expect("prospect mutex poisoned");
        if guard.iter().any(|stored| stored.id == prospect.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(prospect.clone());
        Ok(prospect)
    }

    fn find_by_id(&self, id: &ProspectId) -> Result<Option<Prospect>, RepositoryError> {
        let guard = self.records.lock().expect("prospect mutex poisoned");
        Ok(guard.iter().find(|prospect| &prospect.id == id).cloned())
    }

    fn find_many(&self, filters: &ProspectFilters) -> Result<Vec<Prospect>, RepositoryError> {
        let guard = self.records.lock().expect("prospect mutex poisoned");
        Ok(guard
            .iter()
            .filter(|prospect| filters.matches(prospect))
            .cloned()
            .collect())
    }

    fn update(&self, prospect: Prospect) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("prospect mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == prospect.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = prospect;
        Ok(())
    }
}

pub(super) struct UnavailableProspects;

impl ProspectRepository for UnavailableProspects {
    fn insert(&self, _prospect: Prospect) -> Result<Prospect, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: &ProspectId) -> Result<Option<Prospect>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_many(&self, _filters: &ProspectFilters) -> Result<Vec<Prospect>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _prospect: Prospect) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct MemoryMarketplace;

impl MarketplaceRepositories for MemoryMarketplace {
    type Listings = MemoryListings;
    type Partners = MemoryPartners;
    type Credit = MemoryCredit;
    type Prospects = MemoryProspects;
}

pub(super) struct Fixture {
    pub(super) services: Arc<MarketplaceServices<MemoryMarketplace>>,
    pub(super) prospects: MemoryProspects,
}

pub(super) fn fixture(listings: Vec<Listing>, partners: Vec<BankPartner>) -> Fixture {
    let prospects = MemoryProspects::default();
    let services = MarketplaceServices::<MemoryMarketplace>::new(
        Arc::new(MemoryListings::with(listings)),
        Arc::new(MemoryPartners::with(partners)),
        Arc::new(MemoryCredit::default()),
        Arc::new(prospects.clone()),
        EngineConfig::default(),
    )
    .with_clock(now);
    Fixture {
        services: Arc::new(services),
        prospects,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
