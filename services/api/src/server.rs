use crate::cli::ServeArgs;
use crate::infra::{
    locate, locate_base_uri, templates_dir, AppState, FileTemplateResolver,
    FixtureApplicationLookup, HandlebarsViewRenderer, HtmlPreviewConverter, DEFAULT_FIXTURES,
};
use crate::routes::with_document_routes;
use application_docs::config::AppConfig;
use application_docs::documents::DocumentDispatcher;
use application_docs::error::AppError;
use application_docs::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::path::PathBuf;
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

    let fixtures = args
        .fixtures
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES));
    let fixtures = locate(fixtures);
    let lookup = FixtureApplicationLookup::from_path(&fixtures)?;
    info!(fixtures = %fixtures.display(), applications = lookup.len(), "loaded applications");

    let base_uri = locate_base_uri(&config.templates.base_uri);
    let dispatcher = Arc::new(DocumentDispatcher::new(
        Arc::new(lookup),
        Arc::new(FileTemplateResolver),
        Arc::new(HandlebarsViewRenderer::new()),
        Arc::new(HtmlPreviewConverter::new(templates_dir(&base_uri))),
        config.documents.clone(),
    ));

    let app = with_document_routes(dispatcher, &base_uri)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "application document service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
