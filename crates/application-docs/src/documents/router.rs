use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::collaborators::{ApplicationLookup, PdfConverter, TemplateResolver, ViewRenderer};
use super::dispatcher::{DocumentDispatcher, DocumentError};
use super::domain::ApplicationId;

/// Shared handler state: the dispatcher and the base URI templates are served from.
pub struct DocumentRouteState<L, T, R, C> {
    pub dispatcher: Arc<DocumentDispatcher<L, T, R, C>>,
    pub base_uri: Arc<str>,
}

impl<L, T, R, C> Clone for DocumentRouteState<L, T, R, C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            base_uri: Arc::clone(&self.base_uri),
        }
    }
}

/// Router builder exposing document generation over HTTP.
pub fn document_router<L, T, R, C>(
    dispatcher: Arc<DocumentDispatcher<L, T, R, C>>,
    base_uri: impl Into<Arc<str>>,
) -> Router
where
    L: ApplicationLookup + 'static,
    T: TemplateResolver + 'static,
    R: ViewRenderer + 'static,
    C: PdfConverter + 'static,
{
    let state = DocumentRouteState {
        dispatcher,
        base_uri: base_uri.into(),
    };

    Router::new()
        .route(
            "/api/v1/applications/:application_id/document",
            get(document_handler::<L, T, R, C>),
        )
        .with_state(state)
}

pub(crate) async fn document_handler<L, T, R, C>(
    State(state): State<DocumentRouteState<L, T, R, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLookup + 'static,
    T: TemplateResolver + 'static,
    R: ViewRenderer + 'static,
    C: PdfConverter + 'static,
{
    let id = ApplicationId(application_id);
    match state.dispatcher.generate_document(&id, &state.base_uri) {
        Ok(Some(document)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, document.media_type)],
            document.bytes,
        )
            .into_response(),
        Ok(None) => {
            let payload = json!({
                "application_id": id.0,
                "error": "no document available",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(DocumentError::InvalidDomainData(error)) => {
            let payload = json!({
                "application_id": id.0,
                "error": error.to_string(),
                "missing": error.missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(DocumentError::PortfolioOverflow(error)) => {
            let payload = json!({
                "application_id": id.0,
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
