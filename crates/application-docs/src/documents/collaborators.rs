use serde::Serialize;

use super::domain::{Application, ApplicationId};
use super::view_model::{TemplateName, ViewModel};

/// Read-only access to stored applications.
pub trait ApplicationLookup: Send + Sync {
    fn find(&self, id: &ApplicationId) -> Result<Option<Application>, LookupError>;
}

/// Error enumeration for lookup failures. A missing record is `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("application store unavailable: {0}")]
    Unavailable(String),
}

/// Maps a logical template name onto a path fragment appended to the base URI.
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, template: TemplateName) -> String;
}

/// Renders a view model through the template found at `url`.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, url: &str, view: &ViewModel) -> Result<String, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not found at {url}")]
    TemplateNotFound { url: String },
    #[error("failed to render {url}: {reason}")]
    Failed { url: String, reason: String },
}

/// Turns rendered markup into a printable document.
pub trait PdfConverter: Send + Sync {
    type Document: DocumentHandle;

    #[allow(clippy::wrong_self_convention)]
    fn from_html(&self, markup: &str, options: &RenderOptions)
        -> Result<Self::Document, ConversionError>;
}

pub trait DocumentHandle {
    fn to_bytes(&self) -> Vec<u8>;

    fn media_type(&self) -> &'static str {
        "application/pdf"
    }
}

#[derive(Debug, thiserror::Error)]
#[error("document conversion failed: {0}")]
pub struct ConversionError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNumbering {
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRepeat {
    FirstPageOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderOptions {
    pub template: &'static str,
    pub repeat: HeaderRepeat,
}

/// Page layout passed to the converter alongside the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub page_numbering: PageNumbering,
    pub header: HeaderOptions,
}

impl RenderOptions {
    pub const HEADER_TEMPLATE: &'static str = "document-header.html";

    pub fn standard() -> Self {
        Self {
            page_numbering: PageNumbering::Numeric,
            header: HeaderOptions {
                template: Self::HEADER_TEMPLATE,
                repeat: HeaderRepeat::FirstPageOnly,
            },
        }
    }
}
