use autoplaza::marketplace::catalog::{CatalogError, CatalogImporter};
use autoplaza::marketplace::financing::{find_best_match, FinancingRequest, MatchingWeights};
use autoplaza::marketplace::listings::{rank, HeatPolicy, ListingFilters, ListingStatus, SortBy};
use chrono::{TimeZone, Utc};

#[test]
fn bundled_listing_catalog_imports_and_ranks() {
    let data = include_bytes!("../data/listings.csv");
    let listings = CatalogImporter::listings_from_reader(&data[..]).expect("listings import");

    assert_eq!(listings.len(), 8);
    assert!(listings
        .iter()
        .any(|listing| listing.status == ListingStatus::Sold && listing.color.is_none()));

    let now = Utc
        .with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let filters = ListingFilters {
        brand: Some("MAZDA".to_string()),
        ..ListingFilters::default()
    };
    let ranked = rank(listings, &filters, SortBy::Recent, &HeatPolicy::default(), now);
    let ids: Vec<&str> = ranked.iter().map(|listing| listing.id.0.as_str()).collect();
    assert_eq!(ids, vec!["lst-003", "lst-001", "lst-002"]);
}

#[test]
fn bundled_partner_catalog_matches_with_incidents_applied() {
    let partners = CatalogImporter::partners_from_readers(
        &include_bytes!("../data/partners.csv")[..],
        Some(&include_bytes!("../data/incidents.csv")[..]),
    )
    .expect("partners import");
    assert_eq!(partners.len(), 5);

    let long_term = find_best_match(
        partners.clone(),
        &FinancingRequest {
            amount: 250_000,
            term: 36,
            vehicle_year: Some(2019),
        },
        &MatchingWeights::default(),
    );
    let names: Vec<&str> = long_term.iter().map(|partner| partner.name.as_str()).collect();
    assert_eq!(names, vec!["Banco del Norte", "Financiera Sur", "Banca Central"]);

    let short_term = find_best_match(
        partners,
        &FinancingRequest {
            amount: 250_000,
            term: 18,
            vehicle_year: Some(2019),
        },
        &MatchingWeights::default(),
    );
    assert_eq!(short_term[0].name, "Crédito Express");
    assert_eq!(
        short_term.last().map(|partner| partner.name.as_str()),
        Some("Banca Central")
    );
}

#[test]
fn importer_reads_catalog_files_from_disk() {
    let dir = std::env::temp_dir().join(format!("autoplaza-catalog-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let partners = dir.join("partners.csv");
    std::fs::write(
        &partners,
        "id,name,credit_rate,min_term,max_term,min_vehicle_year,requirements,processing_time,is_active\n\
bp-1,Banco Uno,10.0,12,48,,INE,3,true\n",
    )
    .expect("write partners");

    let loaded = CatalogImporter::partners_from_paths(&partners, None).expect("partners load");
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].incidents.is_empty());

    let missing = dir.join("incidents.csv");
    assert!(matches!(
        CatalogImporter::partners_from_paths(&partners, Some(&missing)),
        Err(CatalogError::Io(_))
    ));

    std::fs::remove_dir_all(&dir).ok();
}
