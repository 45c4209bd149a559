use serde::Serialize;

use super::domain::{BankPartner, BankPartnerId, FinancingRequest};

/// Constant-payment loan quote from one partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOffer {
    pub rank: usize,
    pub partner_id: BankPartnerId,
    pub partner_name: String,
    pub credit_rate: f64,
    pub term: u16,
    pub processing_time: u16,
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

/// French amortization: `P·r / (1 − (1 + r)^−n)` with `r` the monthly rate.
pub fn monthly_payment(principal: u64, annual_rate_pct: f64, months: u16) -> f64 {
    let principal = principal as f64;
    if months == 0 {
        return round_cents(principal);
    }

    let n = f64::from(months);
    let r = annual_rate_pct / 12.0 / 100.0;
    if r.abs() < f64::EPSILON {
        return round_cents(principal / n);
    }

    round_cents(principal * r / (1.0 - (1.0 + r).powf(-n)))
}

/// Quotes for already ranked partners, keeping their order.
pub fn quote_offers(request: &FinancingRequest, ranked: &[BankPartner]) -> Vec<LoanOffer> {
    ranked
        .iter()
        .enumerate()
        .map(|(index, partner)| {
            let monthly = monthly_payment(request.amount, partner.credit_rate, request.term);
            let total = round_cents(monthly * f64::from(request.term.max(1)));
            LoanOffer {
                rank: index + 1,
                partner_id: partner.id.clone(),
                partner_name: partner.name.clone(),
                credit_rate: partner.credit_rate,
                term: request.term,
                processing_time: partner.processing_time,
                monthly_payment: monthly,
                total_payment: total,
                total_interest: round_cents((total - request.amount as f64).max(0.0)),
            }
        })
        .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
