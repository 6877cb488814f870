use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_listing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use travel_listings::config::AppConfig;
use travel_listings::error::AppError;
use travel_listings::listings::{seed, InMemoryStore, ListingService, SeedPlan};
use travel_listings::telemetry;

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

    let store = Arc::new(InMemoryStore::new());
    if args.seed {
        let today = Local::now().date_naive();
        let report = seed(store.as_ref(), &SeedPlan::default(), today)?;
        info!(
            listings = report.listings_created,
            bookings = report.bookings_created,
            reviews = report.reviews_created,
            "sample data loaded"
        );
    }
    let listing_service = Arc::new(ListingService::new(store));

    let app = with_listing_routes(listing_service, config.listings)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "travel listings service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
