use std::sync::Arc;

use super::amortization::{quote_offers, LoanOffer};
use super::domain::{
    BankPartner, BankPartnerId, FinancingRequest, Incident, IncidentStats, PartnerError,
};
use super::matching::{self, MatchingWeights, ScoredPartner};
use super::repository::BankPartnerRepository;
use crate::marketplace::repository::RepositoryError;
use crate::marketplace::validation::{ValidationError, Violations};

/// Service composing the partner repository with the matching rules.
pub struct FinancingService<R> {
    repository: Arc<R>,
    weights: MatchingWeights,
}

impl<R> FinancingService<R>
where
    R: BankPartnerRepository + 'static,
{
    pub fn new(repository: Arc<R>, weights: MatchingWeights) -> Self {
        Self {
            repository,
            weights,
        }
    }

    /// Eligible partners for `request`, best first, with their composite scores.
    pub fn scored_matches(
        &self,
        request: &FinancingRequest,
    ) -> Result<Vec<ScoredPartner>, FinancingServiceError> {
        validate_request(request)?;
        let candidates = self.candidates(request)?;
        Ok(matching::score_partners(candidates, request, &self.weights))
    }

    pub fn find_best_match(
        &self,
        request: &FinancingRequest,
    ) -> Result<Vec<BankPartner>, FinancingServiceError> {
        Ok(self
            .scored_matches(request)?
            .into_iter()
            .map(|scored| scored.partner)
            .collect())
    }

    pub fn quote(&self, request: &FinancingRequest) -> Result<Vec<LoanOffer>, FinancingServiceError> {
        let ranked = self.find_best_match(request)?;
        Ok(quote_offers(request, &ranked))
    }

    pub fn record_incident(
        &self,
        partner_id: &BankPartnerId,
        incident: Incident,
    ) -> Result<IncidentStats, FinancingServiceError> {
        let mut partner = self.fetch(partner_id)?;
        let stats = partner.record_incident(incident);
        self.repository.update(partner)?;
        Ok(stats)
    }

    pub fn resolve_incident(
        &self,
        partner_id: &BankPartnerId,
        index: usize,
    ) -> Result<IncidentStats, FinancingServiceError> {
        let mut partner = self.fetch(partner_id)?;
        let stats = partner.resolve_incident(index)?;
        self.repository.update(partner)?;
        Ok(stats)
    }

    fn fetch(&self, partner_id: &BankPartnerId) -> Result<BankPartner, FinancingServiceError> {
        Ok(self
            .repository
            .find_by_id(partner_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    // The repository pre-filters; eligibility is still re-checked by the matcher.
    fn candidates(&self, request: &FinancingRequest) -> Result<Vec<BankPartner>, RepositoryError> {
        match request.vehicle_year {
            Some(year) => self.repository.find_active_for_vehicle_year(year),
            None => self.repository.find_active_for_simulator(),
        }
    }
}

fn validate_request(request: &FinancingRequest) -> Result<(), ValidationError> {
    let mut violations = Violations::default();
    if request.amount == 0 {
        violations.push("amount", "must be greater than zero");
    }
    if request.term == 0 {
        violations.push("term", "must be at least one month");
    }
    violations.finish()
}

/// Error raised by the financing service.
#[derive(Debug, thiserror::Error)]
pub enum FinancingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Partner(#[from] PartnerError),
}
