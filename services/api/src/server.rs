use crate::cli::ServeArgs;
use crate::infra::{
    default_calculator_config, AppState, InMemoryConstructionRepository,
    InMemoryRateScheduleRepository,
};
use crate::routes::with_calculator_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::fs::File;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use valuer::calculators::construction::{parse_schedule_csv, CalculationService};
use valuer::config::AppConfig;
use valuer::error::AppError;
use valuer::telemetry;

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

    let schedule = match args.rates.take() {
        Some(path) => {
            let rows = parse_schedule_csv(File::open(&path)?)?;
            info!(rows = rows.len(), file = %path.display(), "rate schedule seeded");
            InMemoryRateScheduleRepository::with_rows(rows)
        }
        None => InMemoryRateScheduleRepository::default(),
    };

    let calculation_service = Arc::new(CalculationService::new(
        Arc::new(InMemoryConstructionRepository::default()),
        Arc::new(schedule),
        default_calculator_config(),
    ));

    let app = with_calculator_routes(calculation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "construction cost calculator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
