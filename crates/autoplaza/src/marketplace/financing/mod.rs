//! Bank-partner eligibility, ranking, and loan quotes.

pub mod amortization;
pub mod domain;
pub mod matching;
pub mod repository;
pub mod service;

pub use amortization::{monthly_payment, quote_offers, LoanOffer};
pub use domain::{
    BankPartner, BankPartnerId, FinancingRequest, Incident, IncidentSeverity, IncidentStats,
    PartnerError,
};
pub use matching::{
    check_eligibility, find_best_match, score_partners, Ineligibility, MatchingWeights,
    ScoredPartner,
};
pub use repository::BankPartnerRepository;
pub use service::{FinancingService, FinancingServiceError};
