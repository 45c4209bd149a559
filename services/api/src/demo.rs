use crate::infra::{in_memory_services, InMemoryMarketplace};
use autoplaza::config::EngineConfig;
use autoplaza::error::AppError;
use autoplaza::marketplace::catalog::CatalogImporter;
use autoplaza::marketplace::credit::{
    CreditApplicationDraft, CreditApplicationStatus, EmergencyContact, EmploymentInfo,
    FinancialInfo, PersonalInfo,
};
use autoplaza::marketplace::financing::{quote_offers, BankPartner, FinancingRequest};
use autoplaza::marketplace::listings::{
    HeatPolicy, Listing, ListingFilters, ListingId, Page, SortBy, UserId,
};
use autoplaza::marketplace::prospects::{ProspectDraft, ProspectFilters, ProspectStatus};
use autoplaza::marketplace::router::MarketplaceServices;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::path::PathBuf;

const SAMPLE_LISTINGS: &str = include_str!("../../../crates/autoplaza/data/listings.csv");
const SAMPLE_PARTNERS: &str = include_str!("../../../crates/autoplaza/data/partners.csv");
const SAMPLE_INCIDENTS: &str = include_str!("../../../crates/autoplaza/data/incidents.csv");

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Listings CSV export
    #[arg(long)]
    pub(crate) listings: PathBuf,
    /// recent, price_low, price_high, popular or views
    #[arg(long, default_value = "recent")]
    pub(crate) sort: SortBy,
    /// Only rank this brand (case-insensitive)
    #[arg(long)]
    pub(crate) brand: Option<String>,
    /// Maximum rows to print
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Bank partner CSV export
    #[arg(long)]
    pub(crate) partners: PathBuf,
    /// Optional incident CSV joined onto partners by id
    #[arg(long)]
    pub(crate) incidents: Option<PathBuf>,
    /// Requested amount in whole currency units
    #[arg(long)]
    pub(crate) amount: u64,
    /// Term in months
    #[arg(long)]
    pub(crate) term: u16,
    /// Model year of the vehicle being financed
    #[arg(long)]
    pub(crate) vehicle_year: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference instant (RFC 3339). Defaults to the sample catalog's reporting date.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Skip the credit application and prospect portion of the demo.
    #[arg(long)]
    pub(crate) skip_lifecycles: bool,
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

fn sample_reporting_date() -> DateTime<Utc> {
    parse_instant("2026-05-01T12:00:00Z").unwrap_or_else(|_| Utc::now())
}

pub(crate) fn run_rank(args: RankArgs, engine: &EngineConfig) -> Result<(), AppError> {
    let RankArgs {
        listings,
        sort,
        brand,
        limit,
    } = args;

    let listings = CatalogImporter::listings_from_path(&listings)?;
    let filters = ListingFilters {
        brand,
        ..ListingFilters::default()
    };
    let policy = &engine.heat;
    let now = Utc::now();
    let ranked = autoplaza::marketplace::listings::rank(listings, &filters, sort, policy, now);

    println!("{} listings ranked by {}", ranked.len(), sort.label());
    for (position, listing) in ranked.iter().take(limit).enumerate() {
        print_listing(position + 1, listing, policy, now);
    }
    Ok(())
}

pub(crate) fn run_match(args: MatchArgs, engine: &EngineConfig) -> Result<(), AppError> {
    let MatchArgs {
        partners,
        incidents,
        amount,
        term,
        vehicle_year,
    } = args;

    let partners = CatalogImporter::partners_from_paths(&partners, incidents.as_ref())?;
    let services = offer_services(partners, engine);
    let request = FinancingRequest {
        amount,
        term,
        vehicle_year,
    };
    print_offers(&services, &request);
    Ok(())
}

fn offer_services(
    partners: Vec<BankPartner>,
    engine: &EngineConfig,
) -> MarketplaceServices<InMemoryMarketplace> {
    in_memory_services(Vec::new(), partners, engine.clone())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(sample_reporting_date);
    let listings = CatalogImporter::listings_from_reader(SAMPLE_LISTINGS.as_bytes())?;
    let partners = CatalogImporter::partners_from_readers(
        SAMPLE_PARTNERS.as_bytes(),
        Some(SAMPLE_INCIDENTS.as_bytes()),
    )?;
    let services = in_memory_services(listings, partners, EngineConfig::default());

    println!("Marketplace demo as of {}", now.format("%Y-%m-%d %H:%M UTC"));
    demo_feed(&services, now);

    println!("\nFinancing simulator: 250,000 over 36 months for a 2019 vehicle");
    print_offers(
        &services,
        &FinancingRequest {
            amount: 250_000,
            term: 36,
            vehicle_year: Some(2019),
        },
    );

    if args.skip_lifecycles {
        return Ok(());
    }

    demo_credit(&services, now);
    demo_prospects(&services, now);
    Ok(())
}

fn demo_feed(services: &MarketplaceServices<InMemoryMarketplace>, now: DateTime<Utc>) {
    println!("\nMost popular active listings");
    let active = ListingFilters {
        status: Some(autoplaza::marketplace::listings::ListingStatus::Active),
        ..ListingFilters::default()
    };
    match services
        .listings
        .search(&active, SortBy::Popular, Page { page: 1, per_page: 5 }, now)
    {
        Ok(listings) => {
            for (position, listing) in listings.iter().enumerate() {
                print_listing(position + 1, listing, services.listings.policy(), now);
            }
        }
        Err(err) => println!("  Feed unavailable: {}", err),
    }

    match services.listings.featured(Some(3)) {
        Ok(featured) => {
            let ids: Vec<&str> = featured.iter().map(|listing| listing.id.0.as_str()).collect();
            println!("Featured: {}", ids.join(", "));
        }
        Err(err) => println!("  Featured feed unavailable: {}", err),
    }

    let reference = ListingId("lst-001".to_string());
    match services.listings.similar(&reference, Some(3)) {
        Ok(similar) if similar.is_empty() => println!("No listings similar to {}", reference.0),
        Ok(similar) => {
            let ids: Vec<&str> = similar.iter().map(|listing| listing.id.0.as_str()).collect();
            println!("Similar to {}: {}", reference.0, ids.join(", "));
        }
        Err(err) => println!("  Similar listings unavailable: {}", err),
    }
}

fn demo_credit(services: &MarketplaceServices<InMemoryMarketplace>, now: DateTime<Utc>) {
    println!("\nCredit application lifecycle");
    let application = match services.credit.submit(demo_credit_draft(), now) {
        Ok(application) => application,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return;
        }
    };
    println!("- Received {} -> {:?}", application.id.0, application.status);

    if let Err(err) =
        services
            .credit
            .transition(&application.id, CreditApplicationStatus::Disbursed, now)
    {
        println!("  Skipping review is refused: {}", err);
    }

    let steps = [
        CreditApplicationStatus::UnderReview,
        CreditApplicationStatus::Approved,
        CreditApplicationStatus::Disbursed,
    ];
    for (offset, status) in steps.into_iter().enumerate() {
        let at = now + Duration::days(offset as i64 + 1);
        match services.credit.transition(&application.id, status, at) {
            Ok(updated) => println!(
                "- {} -> {:?} on {}",
                updated.id.0,
                updated.status,
                at.format("%Y-%m-%d")
            ),
            Err(err) => {
                println!("  Transition failed: {}", err);
                return;
            }
        }
    }
}

fn demo_credit_draft() -> CreditApplicationDraft {
    CreditApplicationDraft {
        user_id: UserId("buyer-demo".to_string()),
        personal_info: PersonalInfo {
            name: "Valeria Núñez".to_string(),
            phone: Some("+52 81 2345 6789".to_string()),
            email: Some("valeria.nunez@example.mx".to_string()),
            ..PersonalInfo::default()
        },
        employment_info: EmploymentInfo {
            employer: Some("Grupo Industrial Monterrey".to_string()),
            position: Some("Quality engineer".to_string()),
            months_employed: Some(40),
        },
        financial_info: FinancialInfo {
            monthly_income: 42_000,
            monthly_expenses: 15_000,
            requested_amount: Some(250_000),
            down_payment: Some(60_000),
        },
        emergency_contact: EmergencyContact {
            name: "Héctor Núñez".to_string(),
            phone: "+52 81 8765 4321".to_string(),
            relationship: Some("father".to_string()),
        },
        listing_id: Some(ListingId("lst-001".to_string())),
        documents: Vec::new(),
    }
}

fn demo_prospects(services: &MarketplaceServices<InMemoryMarketplace>, now: DateTime<Utc>) {
    println!("\nProspect follow-up");
    let drafts = [
        ("Marco Villarreal", "website", now - Duration::days(12)),
        ("Paola Garza", "whatsapp", now - Duration::hours(3)),
        ("Andrés Cavazos", "phone", now - Duration::days(2)),
    ];

    let mut created = Vec::new();
    for (name, source, at) in drafts {
        let draft = ProspectDraft {
            name: name.to_string(),
            phone: "8110002000".to_string(),
            source: source.to_string(),
            listing_id: Some(ListingId("lst-001".to_string())),
            created_by: UserId("agent-ana".to_string()),
            ..ProspectDraft::default()
        };
        match services.prospects.create(draft, at) {
            Ok(prospect) => created.push(prospect),
            Err(err) => println!("  Lead rejected: {}", err),
        }
    }

    if let Some(walk_in) = created.get(2) {
        let outcome = services
            .prospects
            .transition(&walk_in.id, ProspectStatus::Contacted, now)
            .and_then(|_| {
                services.prospects.reassign(
                    &walk_in.id,
                    UserId("agent-beto".to_string()),
                    Some("Closer to the buyer".to_string()),
                    now,
                )
            })
            .and_then(|_| {
                services.prospects.schedule_appointment(
                    &walk_in.id,
                    now + Duration::hours(20),
                    Some("Test drive".to_string()),
                    now,
                )
            });
        match outcome {
            Ok(prospect) => println!(
                "- {} contacted, now owned by {} with a test drive booked",
                prospect.id.0,
                prospect.assigned_to().as_str()
            ),
            Err(err) => println!("  Follow-up failed: {}", err),
        }
    }

    match services.prospects.queues(&ProspectFilters::default(), now) {
        Ok(queues) => {
            let stale: Vec<&str> = queues.stale.iter().map(|id| id.0.as_str()).collect();
            let hot: Vec<&str> = queues.hot.iter().map(|id| id.0.as_str()).collect();
            println!("Stale: [{}]", stale.join(", "));
            println!("Hot:   [{}]", hot.join(", "));
        }
        Err(err) => println!("  Queues unavailable: {}", err),
    }
}

fn print_offers(services: &MarketplaceServices<InMemoryMarketplace>, request: &FinancingRequest) {
    let scored = match services.financing.scored_matches(request) {
        Ok(scored) => scored,
        Err(err) => {
            println!("  Request rejected: {}", err);
            return;
        }
    };
    if scored.is_empty() {
        println!("  No partner can finance this request");
        return;
    }

    let ranked: Vec<BankPartner> = scored.iter().map(|entry| entry.partner.clone()).collect();
    for (entry, offer) in scored.iter().zip(quote_offers(request, &ranked)) {
        println!(
            "  {}. {} | {:.2}% | {} days | {:.2}/month | {:.2} interest | score {:.3}{}",
            offer.rank,
            offer.partner_name,
            offer.credit_rate,
            offer.processing_time,
            offer.monthly_payment,
            offer.total_interest,
            entry.composite_score,
            if entry.unresolved_incidents > 0 {
                format!(" | {} open incident(s)", entry.unresolved_incidents)
            } else {
                String::new()
            }
        );
    }
}

fn print_listing(position: usize, listing: &Listing, policy: &HeatPolicy, now: DateTime<Utc>) {
    println!(
        "  {}. {} {} {} {} | {} | {} views / {} likes | {}",
        position,
        listing.id.0,
        listing.brand,
        listing.model,
        listing.year,
        listing.price,
        listing.views_count,
        listing.likes_count,
        policy.tier_of(listing, now).label()
    );
}
