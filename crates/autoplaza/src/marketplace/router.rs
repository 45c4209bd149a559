use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::credit::{
    CreditApplicationDraft, CreditApplicationId, CreditApplicationRepository,
    CreditApplicationService, CreditApplicationStatus, CreditServiceError,
};
use super::financing::{
    quote_offers, BankPartnerId, BankPartnerRepository, FinancingRequest, FinancingService,
    FinancingServiceError, LoanOffer,
};
use super::listings::{
    HeatTier, Listing, ListingFeedService, ListingFilters, ListingId, ListingRepository,
    ListingServiceError, Page, SortBy, UserId,
};
use super::prospects::{
    ProspectDraft, ProspectFilters, ProspectId, ProspectQueues, ProspectRepository,
    ProspectService, ProspectServiceError, ProspectStatus,
};
use super::repository::RepositoryError;
use super::validation::ValidationError;
use crate::config::EngineConfig;

/// Repository types backing one marketplace deployment.
pub trait MarketplaceRepositories: Send + Sync + 'static {
    type Listings: ListingRepository + 'static;
    type Partners: BankPartnerRepository + 'static;
    type Credit: CreditApplicationRepository + 'static;
    type Prospects: ProspectRepository + 'static;
}

/// Shared handler state: one service per area plus the clock used for `now`.
pub struct MarketplaceServices<S: MarketplaceRepositories> {
    pub listings: ListingFeedService<S::Listings>,
    pub financing: FinancingService<S::Partners>,
    pub credit: CreditApplicationService<S::Credit>,
    pub prospects: ProspectService<S::Prospects>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: MarketplaceRepositories> MarketplaceServices<S> {
    pub fn new(
        listings: Arc<S::Listings>,
        partners: Arc<S::Partners>,
        credit: Arc<S::Credit>,
        prospects: Arc<S::Prospects>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            listings: ListingFeedService::new(listings, engine.heat),
            financing: FinancingService::new(partners, engine.matching),
            credit: CreditApplicationService::new(credit),
            prospects: ProspectService::new(prospects, engine.prospects),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Router builder exposing the marketplace services as JSON endpoints.
pub fn marketplace_router<S: MarketplaceRepositories>(
    services: Arc<MarketplaceServices<S>>,
) -> Router {
    Router::new()
        .route("/api/v1/listings/search", post(search_listings::<S>))
        .route("/api/v1/listings/featured", get(featured_listings::<S>))
        .route("/api/v1/listings/:listing_id/similar", get(similar_listings::<S>))
        .route("/api/v1/financing/match", post(match_financing::<S>))
        .route("/api/v1/credit-applications", post(submit_credit::<S>))
        .route(
            "/api/v1/credit-applications/:application_id/status",
            post(change_credit_status::<S>),
        )
        .route("/api/v1/prospects", post(create_prospect::<S>))
        .route("/api/v1/prospects/queues", get(prospect_queues::<S>))
        .route(
            "/api/v1/prospects/:prospect_id/status",
            post(change_prospect_status::<S>),
        )
        .route(
            "/api/v1/prospects/:prospect_id/reassign",
            post(reassign_prospect::<S>),
        )
        .route(
            "/api/v1/prospects/:prospect_id/appointment",
            post(schedule_appointment::<S>),
        )
        .with_state(services)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SearchRequest {
    pub(crate) filters: ListingFilters,
    pub(crate) sort: SortBy,
    pub(crate) page: Option<Page>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListingView {
    #[serde(flatten)]
    pub(crate) listing: Listing,
    pub(crate) heat: HeatTier,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LimitQuery {
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankedPartnerView {
    pub(crate) id: BankPartnerId,
    pub(crate) name: String,
    pub(crate) composite_score: f64,
    pub(crate) unresolved_incidents: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatchResponse {
    pub(crate) partners: Vec<RankedPartnerView>,
    pub(crate) offers: Vec<LoanOffer>,
}

/// Status change request; `override` switches to the audited administrative path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusChangeRequest<T> {
    pub(crate) status: T,
    #[serde(default, rename = "override")]
    pub(crate) admin_override: bool,
    #[serde(default)]
    pub(crate) actor: Option<UserId>,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReassignRequest {
    pub(crate) to_user_id: UserId,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppointmentRequest {
    pub(crate) at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueueQuery {
    pub(crate) assigned_to: Option<String>,
}

pub(crate) async fn search_listings<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let now = services.now();
    let listings = services.listings.search(
        &request.filters,
        request.sort,
        request.page.unwrap_or_default(),
        now,
    )?;
    Ok(Json(with_heat(&services, listings, now)))
}

pub(crate) async fn featured_listings<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let listings = services.listings.featured(query.limit)?;
    Ok(Json(with_heat(&services, listings, services.now())))
}

pub(crate) async fn similar_listings<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Path(listing_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let listings = services
        .listings
        .similar(&ListingId(listing_id), query.limit)?;
    Ok(Json(with_heat(&services, listings, services.now())))
}

fn with_heat<S: MarketplaceRepositories>(
    services: &MarketplaceServices<S>,
    listings: Vec<Listing>,
    now: DateTime<Utc>,
) -> Vec<ListingView> {
    listings
        .into_iter()
        .map(|listing| ListingView {
            heat: services.listings.heat_of(&listing, now),
            listing,
        })
        .collect()
}

pub(crate) async fn match_financing<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Json(request): Json<FinancingRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let scored = services.financing.scored_matches(&request)?;
    let ranked: Vec<_> = scored.iter().map(|entry| entry.partner.clone()).collect();
    let offers = quote_offers(&request, &ranked);
    let partners = scored
        .into_iter()
        .map(|entry| RankedPartnerView {
            id: entry.partner.id,
            name: entry.partner.name,
            composite_score: entry.composite_score,
            unresolved_incidents: entry.unresolved_incidents,
        })
        .collect();
    Ok(Json(MatchResponse { partners, offers }))
}

pub(crate) async fn submit_credit<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Json(draft): Json<CreditApplicationDraft>,
) -> Result<Response, ApiError> {
    let application = services.credit.submit(draft, services.now())?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

pub(crate) async fn change_credit_status<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusChangeRequest<CreditApplicationStatus>>,
) -> Result<Response, ApiError> {
    let id = CreditApplicationId(application_id);
    let now = services.now();
    let application = if request.admin_override {
        let actor = request.actor.unwrap_or_default();
        let reason = request.reason.unwrap_or_default();
        services
            .credit
            .override_status(&id, request.status, &actor, &reason, now)?
    } else {
        services.credit.transition(&id, request.status, now)?
    };
    Ok(Json(application).into_response())
}

pub(crate) async fn create_prospect<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Json(draft): Json<ProspectDraft>,
) -> Result<Response, ApiError> {
    let prospect = services.prospects.create(draft, services.now())?;
    Ok((StatusCode::CREATED, Json(prospect)).into_response())
}

pub(crate) async fn change_prospect_status<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Path(prospect_id): Path<String>,
    Json(request): Json<StatusChangeRequest<ProspectStatus>>,
) -> Result<Response, ApiError> {
    let id = ProspectId(prospect_id);
    let now = services.now();
    let prospect = if request.admin_override {
        let actor = request.actor.unwrap_or_default();
        let reason = request.reason.unwrap_or_default();
        services
            .prospects
            .override_status(&id, request.status, &actor, &reason, now)?
    } else {
        services.prospects.transition(&id, request.status, now)?
    };
    Ok(Json(prospect).into_response())
}

pub(crate) async fn reassign_prospect<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Path(prospect_id): Path<String>,
    Json(request): Json<ReassignRequest>,
) -> Result<Response, ApiError> {
    let prospect = services.prospects.reassign(
        &ProspectId(prospect_id),
        request.to_user_id,
        request.reason,
        services.now(),
    )?;
    Ok(Json(prospect).into_response())
}

pub(crate) async fn schedule_appointment<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Path(prospect_id): Path<String>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Response, ApiError> {
    let prospect = services.prospects.schedule_appointment(
        &ProspectId(prospect_id),
        request.at,
        request.notes,
        services.now(),
    )?;
    Ok(Json(prospect).into_response())
}

pub(crate) async fn prospect_queues<S: MarketplaceRepositories>(
    State(services): State<Arc<MarketplaceServices<S>>>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<ProspectQueues>, ApiError> {
    let filters = ProspectFilters {
        assigned_to: query.assigned_to.map(UserId),
        ..ProspectFilters::default()
    };
    Ok(Json(services.prospects.queues(&filters, services.now())?))
}

/// Error payloads for the marketplace routes.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Conflict(String),
    Repository(RepositoryError),
    Other(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "violations": err.violations }),
            ),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            ApiError::Repository(RepositoryError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "error": RepositoryError::NotFound.to_string() }),
            ),
            ApiError::Repository(RepositoryError::Conflict) => (
                StatusCode::CONFLICT,
                json!({ "error": RepositoryError::Conflict.to_string() }),
            ),
            ApiError::Repository(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            ApiError::Other(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };
        (status, Json(payload)).into_response()
    }
}

impl From<ListingServiceError> for ApiError {
    fn from(value: ListingServiceError) -> Self {
        match value {
            ListingServiceError::Repository(err) => ApiError::Repository(err),
        }
    }
}

impl From<FinancingServiceError> for ApiError {
    fn from(value: FinancingServiceError) -> Self {
        match value {
            FinancingServiceError::Validation(err) => ApiError::Validation(err),
            FinancingServiceError::Repository(err) => ApiError::Repository(err),
            FinancingServiceError::Partner(err) => ApiError::Other(err.to_string()),
        }
    }
}

impl From<CreditServiceError> for ApiError {
    fn from(value: CreditServiceError) -> Self {
        match value {
            CreditServiceError::Validation(err) => ApiError::Validation(err),
            CreditServiceError::Transition(err) => ApiError::Conflict(err.to_string()),
            CreditServiceError::Repository(err) => ApiError::Repository(err),
        }
    }
}

impl From<ProspectServiceError> for ApiError {
    fn from(value: ProspectServiceError) -> Self {
        match value {
            ProspectServiceError::Validation(err) => ApiError::Validation(err),
            ProspectServiceError::Transition(err) => ApiError::Conflict(err.to_string()),
            ProspectServiceError::Repository(err) => ApiError::Repository(err),
        }
    }
}
