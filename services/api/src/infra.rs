use autoplaza::config::{CatalogConfig, EngineConfig};
use autoplaza::error::AppError;
use autoplaza::marketplace::catalog::CatalogImporter;
use autoplaza::marketplace::credit::{
    CreditApplication, CreditApplicationId, CreditApplicationRepository,
};
use autoplaza::marketplace::financing::{BankPartner, BankPartnerId, BankPartnerRepository};
use autoplaza::marketplace::listings::{
    Listing, ListingFilters, ListingId, ListingRepository, UserId,
};
use autoplaza::marketplace::prospects::{
    Prospect, ProspectFilters, ProspectId, ProspectRepository,
};
use autoplaza::marketplace::router::{MarketplaceRepositories, MarketplaceServices};
use autoplaza::marketplace::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryListings {
    records: Arc<Mutex<Vec<Listing>>>,
}

impl InMemoryListings {
    pub(crate) fn seeded(listings: Vec<Listing>) -> Self {
        Self {
            records: Arc::new(Mutex::new(listings)),
        }
    }
}

impl ListingRepository for InMemoryListings {
    fn find_many(&self, filters: &ListingFilters) -> Result<Vec<Listing>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|listing| filters.matches(listing))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|listing| &listing.id == id)
            .cloned())
    }

    fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|listing| &listing.user_id == user_id)
            .cloned()
            .collect())
    }

    fn increment_views(&self, id: &ListingId) -> Result<u64, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let listing = guard
            .iter_mut()
            .find(|listing| &listing.id == id)
            .ok_or(RepositoryError::NotFound)?;
        listing.views_count = listing.views_count.saturating_add(1);
        Ok(listing.views_count)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPartners {
    records: Arc<Mutex<Vec<BankPartner>>>,
}

impl InMemoryPartners {
    pub(crate) fn seeded(partners: Vec<BankPartner>) -> Self {
        Self {
            records: Arc::new(Mutex::new(partners)),
        }
    }
}

impl BankPartnerRepository for InMemoryPartners {
    fn find_active_for_simulator(&self) -> Result<Vec<BankPartner>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|partner| partner.is_active)
            .cloned()
            .collect())
    }

    fn find_active_for_vehicle_year(
        &self,
        year: u16,
    ) -> Result<Vec<BankPartner>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|partner| partner.is_active)
            .filter(|partner| partner.min_vehicle_year.map_or(true, |min| year >= min))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &BankPartnerId) -> Result<Option<BankPartner>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|partner| &partner.id == id)
            .cloned())
    }

    fn update(&self, partner: BankPartner) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == partner.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = partner;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCreditApplications {
    records: Arc<Mutex<HashMap<CreditApplicationId, CreditApplication>>>,
}

impl CreditApplicationRepository for InMemoryCreditApplications {
    fn insert(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
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
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn update(&self, application: CreditApplication) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get_mut(&application.id) {
            Some(stored) => {
                *stored = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProspects {
    records: Arc<Mutex<Vec<Prospect>>>,
}

impl ProspectRepository for InMemoryProspects {
    fn insert(&self, prospect: Prospect) -> Result<Prospect, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|stored| stored.id == prospect.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(prospect.clone());
        Ok(prospect)
    }

    fn find_by_id(&self, id: &ProspectId) -> Result<Option<Prospect>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|prospect| &prospect.id == id)
            .cloned())
    }

    fn find_many(&self, filters: &ProspectFilters) -> Result<Vec<Prospect>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|prospect| filters.matches(prospect))
            .cloned()
            .collect())
    }

    fn update(&self, prospect: Prospect) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == prospect.id)
            .ok_or(RepositoryError::NotFound)?;
        // History is append-only: keep stored entries and only accept new ones after them.
        if !prospect
            .reassignment_history
            .entries()
            .starts_with(slot.reassignment_history.entries())
        {
            return Err(RepositoryError::Conflict);
        }
        *slot = prospect;
        Ok(())
    }
}

pub(crate) struct InMemoryMarketplace;

impl MarketplaceRepositories for InMemoryMarketplace {
    type Listings = InMemoryListings;
    type Partners = InMemoryPartners;
    type Credit = InMemoryCreditApplications;
    type Prospects = InMemoryProspects;
}

/// Services over fresh in-memory stores seeded with `listings` and `partners`.
pub(crate) fn in_memory_services(
    listings: Vec<Listing>,
    partners: Vec<BankPartner>,
    engine: EngineConfig,
) -> MarketplaceServices<InMemoryMarketplace> {
    MarketplaceServices::new(
        Arc::new(InMemoryListings::seeded(listings)),
        Arc::new(InMemoryPartners::seeded(partners)),
        Arc::new(InMemoryCreditApplications::default()),
        Arc::new(InMemoryProspects::default()),
        engine,
    )
}

/// Listings and partners named by the catalog settings; missing files seed nothing.
pub(crate) fn load_catalog(
    catalog: &CatalogConfig,
) -> Result<(Vec<Listing>, Vec<BankPartner>), AppError> {
    let listings = match &catalog.listings_csv {
        Some(path) => CatalogImporter::listings_from_path(path)?,
        None => Vec::new(),
    };
    let partners = match &catalog.partners_csv {
        Some(path) => CatalogImporter::partners_from_paths(path, catalog.incidents_csv.as_ref())?,
        None => Vec::new(),
    };
    Ok((listings, partners))
}
