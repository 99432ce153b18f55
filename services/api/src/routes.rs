use crate::infra::AppState;
use application_docs::documents::{
    document_router, ApplicationLookup, DocumentDispatcher, PdfConverter, TemplateResolver,
    ViewRenderer,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_document_routes<L, T, R, C>(
    dispatcher: Arc<DocumentDispatcher<L, T, R, C>>,
    base_uri: &str,
) -> axum::Router
where
    L: ApplicationLookup + 'static,
    T: TemplateResolver + 'static,
    R: ViewRenderer + 'static,
    C: PdfConverter + 'static,
{
    document_router(dispatcher, base_uri)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
