use std::cmp::Ordering;

use serde::Serialize;

use super::domain::{BankPartner, FinancingRequest};

/// Weights of the composite partner score. Lower composite scores rank first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchingWeights {
    pub rate: f64,
    pub speed: f64,
    pub risk: f64,
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            rate: 0.5,
            speed: 0.3,
            risk: 0.2,
        }
    }
}

impl MatchingWeights {
    pub fn is_valid(&self) -> bool {
        let weights = [self.rate, self.speed, self.risk];
        weights
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0)
            && weights.iter().sum::<f64>() > 0.0
    }
}

/// Why a partner was excluded from a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Ineligibility {
    Inactive,
    TermOutOfRange { min_term: u16, max_term: u16 },
    VehicleTooOld { min_vehicle_year: u16 },
}

/// Hard constraints; a partner failing any of them is never ranked.
pub fn check_eligibility(
    partner: &BankPartner,
    request: &FinancingRequest,
) -> Result<(), Ineligibility> {
    if !partner.is_active {
        return Err(Ineligibility::Inactive);
    }

    if request.term < partner.min_term || request.term > partner.max_term {
        return Err(Ineligibility::TermOutOfRange {
            min_term: partner.min_term,
            max_term: partner.max_term,
        });
    }

    if let (Some(year), Some(min_year)) = (request.vehicle_year, partner.min_vehicle_year) {
        if year < min_year {
            return Err(Ineligibility::VehicleTooOld {
                min_vehicle_year: min_year,
            });
        }
    }

    Ok(())
}

/// Eligible partner with the values it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPartner {
    pub partner: BankPartner,
    pub composite_score: f64,
    pub unresolved_incidents: usize,
}

/// Eligible partners, best first.
///
/// Rate, processing time and unresolved incidents are min-max normalized over the
/// eligible set and blended with `weights`. Any partner with an unresolved incident
/// sorts after every partner without one, whatever its blended score. Remaining ties
/// fall back to name, then id.
pub fn score_partners(
    partners: Vec<BankPartner>,
    request: &FinancingRequest,
    weights: &MatchingWeights,
) -> Vec<ScoredPartner> {
    let eligible: Vec<(BankPartner, usize)> = partners
        .into_iter()
        .filter(|partner| check_eligibility(partner, request).is_ok())
        .map(|partner| {
            let unresolved = partner.incident_stats().unresolved;
            (partner, unresolved)
        })
        .collect();

    if eligible.is_empty() {
        return Vec::new();
    }

    let rate = Range::over(eligible.iter().map(|(partner, _)| partner.credit_rate));
    let speed = Range::over(
        eligible
            .iter()
            .map(|(partner, _)| f64::from(partner.processing_time)),
    );
    let risk = Range::over(eligible.iter().map(|(_, unresolved)| *unresolved as f64));

    let mut scored: Vec<ScoredPartner> = eligible
        .into_iter()
        .map(|(partner, unresolved)| {
            let composite_score = weights.rate * rate.normalize(partner.credit_rate)
                + weights.speed * speed.normalize(f64::from(partner.processing_time))
                + weights.risk * risk.normalize(unresolved as f64);
            ScoredPartner {
                partner,
                composite_score,
                unresolved_incidents: unresolved,
            }
        })
        .collect();

    scored.sort_by(compare_scored);
    scored
}

/// Ranked partners without their scores. An empty result means "no offer".
pub fn find_best_match(
    partners: Vec<BankPartner>,
    request: &FinancingRequest,
    weights: &MatchingWeights,
) -> Vec<BankPartner> {
    score_partners(partners, request, weights)
        .into_iter()
        .map(|scored| scored.partner)
        .collect()
}

fn compare_scored(a: &ScoredPartner, b: &ScoredPartner) -> Ordering {
    (a.unresolved_incidents > 0)
        .cmp(&(b.unresolved_incidents > 0))
        .then_with(|| a.composite_score.total_cmp(&b.composite_score))
        .then_with(|| a.partner.name.cmp(&b.partner.name))
        .then_with(|| a.partner.id.cmp(&b.partner.id))
}

struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |range, value| Self {
                min: range.min.min(value),
                max: range.max.max(value),
            },
        )
    }

    fn normalize(&self, value: f64) -> f64 {
        let spread = self.max - self.min;
        if spread.is_finite() && spread > f64::EPSILON {
            (value - self.min) / spread
        } else {
            0.0
        }
    }
}
