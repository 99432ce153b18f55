use application_docs::documents::{
    Application, ApplicationId, ApplicationLookup, ConversionError, DocumentHandle, LookupError,
    PdfConverter, RenderError, RenderOptions, TemplateName, TemplateResolver, ViewModel,
    ViewRenderer,
};
use application_docs::error::AppError;
use handlebars::Handlebars;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) const DEFAULT_FIXTURES: &str = "fixtures/applications.json";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only application store hydrated from a JSON fixture file.
#[derive(Default, Clone)]
pub(crate) struct FixtureApplicationLookup {
    records: Arc<HashMap<ApplicationId, Application>>,
}

impl FixtureApplicationLookup {
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        let applications: Vec<Application> = serde_json::from_str(raw)?;
        let records = applications
            .into_iter()
            .map(|application| (application.id.clone(), application))
            .collect();
        Ok(Self {
            records: Arc::new(records),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

impl ApplicationLookup for FixtureApplicationLookup {
    fn find(&self, id: &ApplicationId) -> Result<Option<Application>, LookupError> {
        Ok(self.records.get(id).cloned())
    }
}

/// Maps logical template names onto `.hbs` files under the template base URI.
pub(crate) struct FileTemplateResolver;

impl TemplateResolver for FileTemplateResolver {
    fn resolve(&self, template: TemplateName) -> String {
        let file = match template {
            TemplateName::PendingApplication => "pending-application",
            TemplateName::ActivatedApplication => "activated-application",
            TemplateName::InReviewApplication => "in-review-application",
        };
        format!("/{file}.hbs")
    }
}

/// Renders handlebars templates read from the local filesystem.
pub(crate) struct HandlebarsViewRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsViewRenderer {
    pub(crate) fn new() -> Self {
        Self {
            handlebars: Handlebars::new(),
        }
    }
}

impl ViewRenderer for HandlebarsViewRenderer {
    fn render(&self, url: &str, view: &ViewModel) -> Result<String, RenderError> {
        let source = std::fs::read_to_string(url).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RenderError::TemplateNotFound {
                url: url.to_string(),
            },
            _ => RenderError::Failed {
                url: url.to_string(),
                reason: err.to_string(),
            },
        })?;

        self.handlebars
            .render_template(&source, view)
            .map_err(|err| RenderError::Failed {
                url: url.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Print-ready HTML standing in for a PDF backend.
///
/// The header template is placed once above the body and pages are numbered
/// through CSS counters, mirroring the layout a PDF converter would receive.
pub(crate) struct HtmlPreviewConverter {
    templates_dir: PathBuf,
}

impl HtmlPreviewConverter {
    pub(crate) fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }
}

pub(crate) struct HtmlDocument(String);

impl DocumentHandle for HtmlDocument {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    fn media_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

impl PdfConverter for HtmlPreviewConverter {
    type Document = HtmlDocument;

    fn from_html(
        &self,
        markup: &str,
        options: &RenderOptions,
    ) -> Result<Self::Document, ConversionError> {
        let header_path = self.templates_dir.join(options.header.template);
        let header = std::fs::read_to_string(&header_path).map_err(|err| {
            ConversionError(format!(
                "unable to read header {}: {err}",
                header_path.display()
            ))
        })?;

        Ok(HtmlDocument(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<style>\n@page {{ @bottom-center {{ content: counter(page); }} }}\n</style>\n</head>\n<body>\n<header class=\"first-page\">{header}</header>\n{markup}\n</body>\n</html>\n"
        )))
    }
}

/// Resolves a relative path against the working directory, then against the service crate.
///
/// Lets the bundled fixtures and templates load when commands run from the workspace root.
pub(crate) fn locate(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    if bundled.exists() {
        bundled
    } else {
        path.to_path_buf()
    }
}

/// [`locate`] for template base URIs. URIs with a scheme are returned untouched.
pub(crate) fn locate_base_uri(base_uri: &str) -> String {
    if base_uri.contains("://") {
        return base_uri.to_string();
    }
    let mut located = locate(base_uri).display().to_string();
    if base_uri.ends_with('/') && !located.ends_with('/') {
        located.push('/');
    }
    located
}

pub(crate) fn templates_dir(base_uri: &str) -> PathBuf {
    PathBuf::from(application_docs::documents::normalize_base_uri(base_uri))
}
