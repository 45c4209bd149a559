use super::domain::{BankPartner, BankPartnerId};
use crate::marketplace::repository::RepositoryError;

/// Storage contract for bank partners.
pub trait BankPartnerRepository: Send + Sync {
    fn find_active_for_simulator(&self) -> Result<Vec<BankPartner>, RepositoryError>;
    fn find_active_for_vehicle_year(&self, year: u16)
        -> Result<Vec<BankPartner>, RepositoryError>;
    fn find_by_id(&self, id: &BankPartnerId) -> Result<Option<BankPartner>, RepositoryError>;
    /// Must persist the incident list as given; appends made here are the only writer.
    fn update(&self, partner: BankPartner) -> Result<(), RepositoryError>;
}
