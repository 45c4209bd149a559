use super::common::*;
use crate::marketplace::financing::{
    check_eligibility, find_best_match, monthly_payment, quote_offers, score_partners,
    BankPartnerId, FinancingRequest, FinancingService, FinancingServiceError, IncidentStats,
    Ineligibility, MatchingWeights, PartnerError,
};
use std::sync::Arc;

fn request(term: u16, vehicle_year: Option<u16>) -> FinancingRequest {
    FinancingRequest {
        amount: 200_000,
        term,
        vehicle_year,
    }
}

fn names(partners: &[crate::marketplace::financing::BankPartner]) -> Vec<&str> {
    partners.iter().map(|partner| partner.name.as_str()).collect()
}

#[test]
fn inactive_partners_never_match_even_with_the_best_rate() {
    let mut cheap = partner("p-cheap", "Banco Barato", 5.0, 2);
    cheap.is_active = false;
    let regular = partner("p-regular", "Banco Norte", 14.0, 5);

    let ranked = find_best_match(
        vec![cheap, regular],
        &request(36, None),
        &MatchingWeights::default(),
    );

    assert_eq!(names(&ranked), vec!["Banco Norte"]);
}

#[test]
fn term_outside_partner_window_is_excluded() {
    let mut short = partner("p-short", "Crédito Corto", 9.0, 3);
    short.min_term = 12;
    short.max_term = 24;

    assert_eq!(
        check_eligibility(&short, &request(36, None)),
        Err(Ineligibility::TermOutOfRange {
            min_term: 12,
            max_term: 24
        })
    );
    assert!(find_best_match(vec![short], &request(36, None), &MatchingWeights::default())
        .is_empty());
}

#[test]
fn vehicle_year_is_only_checked_when_both_sides_have_one() {
    let mut strict = partner("p-strict", "Banco Estricto", 10.0, 4);
    strict.min_vehicle_year = Some(2018);

    assert_eq!(
        check_eligibility(&strict, &request(36, Some(2015))),
        Err(Ineligibility::VehicleTooOld {
            min_vehicle_year: 2018
        })
    );
    assert_eq!(check_eligibility(&strict, &request(36, Some(2018))), Ok(()));
    assert_eq!(check_eligibility(&strict, &request(36, None)), Ok(()));

    let lenient = partner("p-lenient", "Banco Flexible", 10.0, 4);
    assert_eq!(check_eligibility(&lenient, &request(36, Some(2001))), Ok(()));
}

#[test]
fn unresolved_incidents_demote_below_clean_partners() {
    let clean = partner("p-a", "Banco A", 12.0, 10);
    let mut flagged = partner("p-b", "Banco B", 8.0, 1);
    flagged.record_incident(incident(false, days_ago(3)));

    let ranked = find_best_match(
        vec![flagged, clean],
        &request(36, None),
        &MatchingWeights::default(),
    );

    assert_eq!(names(&ranked), vec!["Banco A", "Banco B"]);
}

#[test]
fn resolved_incidents_do_not_demote() {
    let slow = partner("p-slow", "Banco Lento", 12.0, 10);
    let mut recovered = partner("p-rec", "Banco Recuperado", 8.0, 1);
    recovered.record_incident(incident(true, days_ago(40)));

    let ranked = find_best_match(
        vec![slow, recovered],
        &request(36, None),
        &MatchingWeights::default(),
    );

    assert_eq!(names(&ranked), vec!["Banco Recuperado", "Banco Lento"]);
}

#[test]
fn composite_weights_rate_above_speed() {
    // Lowest rate but slowest versus highest rate but fastest.
    let cheap_slow = partner("p-1", "Cheap Slow", 10.0, 10);
    let pricey_fast = partner("p-2", "Pricey Fast", 14.0, 2);

    let scored = score_partners(
        vec![pricey_fast.clone(), cheap_slow.clone()],
        &request(36, None),
        &MatchingWeights::default(),
    );
    assert_eq!(scored[0].partner.name, "Cheap Slow");
    assert!((scored[0].composite_score - 0.3).abs() < 1e-9);
    assert!((scored[1].composite_score - 0.5).abs() < 1e-9);

    let speed_first = MatchingWeights {
        rate: 0.2,
        speed: 0.8,
        risk: 0.0,
    };
    let ranked = find_best_match(
        vec![cheap_slow, pricey_fast],
        &request(36, None),
        &speed_first,
    );
    assert_eq!(names(&ranked), vec!["Pricey Fast", "Cheap Slow"]);
}

#[test]
fn equal_scores_fall_back_to_name_order() {
    let ranked = find_best_match(
        vec![
            partner("p-3", "Zeta Financiera", 11.0, 5),
            partner("p-1", "Alfa Crédito", 11.0, 5),
            partner("p-2", "Mega Banco", 11.0, 5),
        ],
        &request(36, None),
        &MatchingWeights::default(),
    );

    assert_eq!(
        names(&ranked),
        vec!["Alfa Crédito", "Mega Banco", "Zeta Financiera"]
    );
}

#[test]
fn no_eligible_partner_is_an_empty_result() {
    let ranked = find_best_match(Vec::new(), &request(36, None), &MatchingWeights::default());
    assert!(ranked.is_empty());
}

#[test]
fn incident_stats_are_recomputed_from_the_list() {
    let mut bank = partner("p-1", "Banco Uno", 11.0, 5);
    assert_eq!(bank.incident_stats(), IncidentStats::default());

    bank.record_incident(incident(false, days_ago(10)));
    let stats = bank.record_incident(incident(true, days_ago(2)));
    assert_eq!(stats.total, 2);
    assert_eq!(stats.unresolved, 1);
    assert_eq!(stats.last_incident, Some(days_ago(2)));

    let stats = bank.resolve_incident(0).expect("incident exists");
    assert_eq!(stats.unresolved, 0);
    assert!(matches!(
        bank.resolve_incident(7),
        Err(PartnerError::IncidentNotFound { index: 7 })
    ));
}

#[test]
fn partner_validation_flags_inverted_terms() {
    let mut bank = partner("p-1", "", 11.0, 5);
    bank.min_term = 48;
    bank.max_term = 24;

    let err = bank.validate().expect_err("invalid partner");
    assert_eq!(err.fields(), vec!["name", "minTerm"]);
}

#[test]
fn monthly_payment_follows_constant_payment_formula() {
    assert_eq!(monthly_payment(120_000, 0.0, 12), 10_000.0);
    assert_eq!(monthly_payment(100_000, 12.0, 12), 8_884.88);
    assert_eq!(monthly_payment(50_000, 10.0, 0), 50_000.0);
}

#[test]
fn offers_keep_match_order_and_totals() {
    let ranked = vec![
        partner("p-1", "Banco Uno", 12.0, 5),
        partner("p-2", "Banco Dos", 0.0, 5),
    ];
    let request = FinancingRequest {
        amount: 100_000,
        term: 12,
        vehicle_year: None,
    };

    let offers = quote_offers(&request, &ranked);

    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].rank, 1);
    assert_eq!(offers[0].partner_id, BankPartnerId("p-1".to_string()));
    assert_eq!(offers[0].total_payment, 106_618.56);
    assert_eq!(offers[0].total_interest, 6_618.56);
    assert_eq!(offers[1].monthly_payment, 8_333.33);
    assert_eq!(offers[1].total_interest, 0.0);
}

#[test]
fn service_uses_vehicle_year_lookup_and_rejects_empty_requests() {
    let mut strict = partner("p-strict", "Banco Estricto", 9.0, 3);
    strict.min_vehicle_year = Some(2020);
    let lenient = partner("p-lenient", "Banco Flexible", 13.0, 6);
    let service = FinancingService::new(
        Arc::new(MemoryPartners::with(vec![strict, lenient])),
        MatchingWeights::default(),
    );

    let ranked = service
        .find_best_match(&request(36, Some(2017)))
        .expect("match succeeds");
    assert_eq!(names(&ranked), vec!["Banco Flexible"]);

    let quotes = service.quote(&request(36, None)).expect("quote succeeds");
    assert_eq!(quotes[0].partner_name, "Banco Estricto");

    match service.find_best_match(&FinancingRequest {
        amount: 0,
        term: 0,
        vehicle_year: None,
    }) {
        Err(FinancingServiceError::Validation(err)) => {
            assert_eq!(err.fields(), vec!["amount", "term"])
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn service_records_incidents_and_demotes_partner() {
    let repository = Arc::new(MemoryPartners::with(vec![
        partner("p-a", "Banco A", 12.0, 10),
        partner("p-b", "Banco B", 8.0, 1),
    ]));
    let service = FinancingService::new(repository, MatchingWeights::default());
    let id = BankPartnerId("p-b".to_string());

    let before = service
        .find_best_match(&request(36, None))
        .expect("match succeeds");
    assert_eq!(names(&before), vec!["Banco B", "Banco A"]);

    let stats = service
        .record_incident(&id, incident(false, days_ago(1)))
        .expect("incident stored");
    assert_eq!(stats.unresolved, 1);
    let after = service
        .find_best_match(&request(36, None))
        .expect("match succeeds");
    assert_eq!(names(&after), vec!["Banco A", "Banco B"]);

    service.resolve_incident(&id, 0).expect("incident resolved");
    let restored = service
        .find_best_match(&request(36, None))
        .expect("match succeeds");
    assert_eq!(names(&restored), vec!["Banco B", "Banco A"]);
}
