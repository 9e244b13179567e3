use crate::cli::ServeArgs;
use crate::infra::{build_pipeline, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use morph_ai::config::AppConfig;
use morph_ai::error::AppError;
use morph_ai::telemetry::{self, LogTarget};
use morph_ai::workflows::performance::performance_router;
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
    if let Some(store) = args.store.take() {
        config.store.path = store;
    }

    telemetry::init(&config.telemetry, LogTarget::Service)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipeline_config = config.clone();
    let pipeline =
        tokio::task::spawn_blocking(move || build_pipeline(&pipeline_config, None, false))
            .await??;

    let app = with_service_routes(performance_router(Arc::new(pipeline)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = %config.store.path.display(), "morph.ai evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
