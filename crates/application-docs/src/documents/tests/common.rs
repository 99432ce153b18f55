use std::collections::HashMap;
use std::io;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::DocumentSettings;
use crate::documents::collaborators::{
    ApplicationLookup, ConversionError, DocumentHandle, LookupError, PdfConverter, RenderError,
    RenderOptions, TemplateResolver, ViewRenderer,
};
use crate::documents::dispatcher::DocumentDispatcher;
use crate::documents::domain::{
    Application, ApplicationId, ApplicationState, Fund, LegalEntity, Person, Product, Review,
};
use crate::documents::view_model::{TemplateName, ViewModel};

pub(super) type TestDispatcher =
    DocumentDispatcher<MemoryLookup, PathResolver, RecordingRenderer, MarkupConverter>;

pub(super) fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal")
}

pub(super) fn settings() -> DocumentSettings {
    DocumentSettings::new("support@fundhouse.test", "Fund House Onboarding", dec("0.2"))
}

pub(super) fn person() -> Person {
    Person {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: Some("ada@example.test".to_string()),
    }
}

pub(super) fn legal_entity() -> LegalEntity {
    LegalEntity {
        name: "Analytical Engines Ltd".to_string(),
        registration_number: "GB-0042".to_string(),
        address: Some("12 St James's Square, London".to_string()),
    }
}

pub(super) fn fund(name: &str, amount: &str, fees: &str) -> Fund {
    Fund {
        name: name.to_string(),
        isin: None,
        amount: dec(amount),
        fees: dec(fees),
    }
}

pub(super) fn products() -> Vec<Product> {
    vec![
        Product {
            name: "Growth".to_string(),
            funds: vec![fund("Global Equity", "100", "10")],
        },
        Product {
            name: "Income".to_string(),
            funds: vec![fund("Sterling Bonds", "50", "5")],
        },
    ]
}

/// Funds at the top of the decimal range; their total cannot be represented.
pub(super) fn overflowing_products() -> Vec<Product> {
    vec![Product {
        name: "Leveraged".to_string(),
        funds: (0..6)
            .map(|n| Fund {
                name: format!("Ceiling {n}"),
                isin: None,
                amount: Decimal::MAX,
                fees: Decimal::ZERO,
            })
            .collect(),
    }]
}

pub(super) fn review(reason: &str) -> Review {
    Review {
        reason: reason.to_string(),
        opened_on: NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date"),
        reviewer: Some("compliance-desk".to_string()),
        notes: None,
    }
}

pub(super) fn application(id: &str, state: ApplicationState) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        state,
        reference_number: format!("REF-{id}"),
        applied_on: NaiveDate::from_ymd_opt(2025, 2, 14).expect("valid date"),
        person: Some(person()),
        is_legal_entity: false,
        legal_entity: None,
        products: products(),
        current_review: None,
    }
}

pub(super) fn in_review_application(id: &str, reason: &str) -> Application {
    let mut application = application(id, ApplicationState::InReview);
    application.current_review = Some(review(reason));
    application
}

pub(super) fn legal_entity_application(id: &str, state: ApplicationState) -> Application {
    let mut application = application(id, state);
    application.is_legal_entity = true;
    application.legal_entity = Some(legal_entity());
    application
}

#[derive(Default, Clone)]
pub(super) struct MemoryLookup {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl MemoryLookup {
    pub(super) fn with(applications: impl IntoIterator<Item = Application>) -> Self {
        let lookup = Self::default();
        {
            let mut guard = lookup.records.lock().expect("lookup mutex poisoned");
            for application in applications {
                guard.insert(application.id.clone(), application);
            }
        }
        lookup
    }
}

impl ApplicationLookup for MemoryLookup {
    fn find(&self, id: &ApplicationId) -> Result<Option<Application>, LookupError> {
        let guard = self.records.lock().expect("lookup mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableLookup;

impl ApplicationLookup for UnavailableLookup {
    fn find(&self, _id: &ApplicationId) -> Result<Option<Application>, LookupError> {
        Err(LookupError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct PathResolver;

impl TemplateResolver for PathResolver {
    fn resolve(&self, template: TemplateName) -> String {
        format!("/views/{}.hbs", template.logical_name())
    }
}

/// Renderer double recording each url and the view model it was handed.
#[derive(Default, Clone)]
pub(super) struct RecordingRenderer {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingRenderer {
    pub(super) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("renderer mutex poisoned").clone()
    }
}

impl ViewRenderer for RecordingRenderer {
    fn render(&self, url: &str, view: &ViewModel) -> Result<String, RenderError> {
        let payload = serde_json::to_value(view).map_err(|err| RenderError::Failed {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        self.calls
            .lock()
            .expect("renderer mutex poisoned")
            .push((url.to_string(), payload));
        Ok(format!("<html>{}</html>", view.template().logical_name()))
    }
}

pub(super) struct MissingTemplateRenderer;

impl ViewRenderer for MissingTemplateRenderer {
    fn render(&self, url: &str, _view: &ViewModel) -> Result<String, RenderError> {
        Err(RenderError::TemplateNotFound {
            url: url.to_string(),
        })
    }
}

/// Converter double returning the markup bytes and keeping the options it saw.
#[derive(Default, Clone)]
pub(super) struct MarkupConverter {
    options: Arc<Mutex<Vec<RenderOptions>>>,
}

impl MarkupConverter {
    pub(super) fn options(&self) -> Vec<RenderOptions> {
        self.options.lock().expect("converter mutex poisoned").clone()
    }
}

pub(super) struct MarkupDocument(Vec<u8>);

impl DocumentHandle for MarkupDocument {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl PdfConverter for MarkupConverter {
    type Document = MarkupDocument;

    fn from_html(
        &self,
        markup: &str,
        options: &RenderOptions,
    ) -> Result<Self::Document, ConversionError> {
        self.options
            .lock()
            .expect("converter mutex poisoned")
            .push(options.clone());
        Ok(MarkupDocument(markup.as_bytes().to_vec()))
    }
}

pub(super) struct Harness {
    pub(super) dispatcher: TestDispatcher,
    pub(super) renderer: RecordingRenderer,
    pub(super) converter: MarkupConverter,
}

pub(super) fn harness(applications: impl IntoIterator<Item = Application>) -> Harness {
    let renderer = RecordingRenderer::default();
    let converter = MarkupConverter::default();
    let dispatcher = DocumentDispatcher::new(
        Arc::new(MemoryLookup::with(applications)),
        Arc::new(PathResolver),
        Arc::new(renderer.clone()),
        Arc::new(converter.clone()),
        settings(),
    );
    Harness {
        dispatcher,
        renderer,
        converter,
    }
}

/// In-memory sink for the fmt subscriber so tests can assert on diagnostics.
#[derive(Default, Clone)]
pub(super) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log mutex poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log mutex poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub(super) fn with_captured_logs<T>(run: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, run);
    (result, logs.contents())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
