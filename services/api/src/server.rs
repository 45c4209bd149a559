use crate::cli::ServeArgs;
use crate::infra::{in_memory_services, load_catalog, AppState};
use crate::routes::with_platform_routes;
use autoplaza::config::AppConfig;
use autoplaza::error::AppError;
use autoplaza::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (listings, partners) = load_catalog(&config.catalog)?;
    info!(
        listings = listings.len(),
        partners = partners.len(),
        "catalog seeded"
    );
    let services = Arc::new(in_memory_services(
        listings,
        partners,
        config.engine.clone(),
    ));

    let app = with_platform_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
