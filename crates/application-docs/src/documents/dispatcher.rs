use std::sync::Arc;

use tracing::{debug, warn};

use super::collaborators::{
    ApplicationLookup, ConversionError, DocumentHandle, LookupError, PdfConverter, RenderError,
    RenderOptions, TemplateResolver, ViewRenderer,
};
use super::domain::ApplicationId;
use super::portfolio::PortfolioOverflow;
use super::validation::InvalidDomainData;
use super::view_model::ViewModelBuilder;
use crate::config::DocumentSettings;

/// Generated document bytes plus the media type reported by the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Service composing application lookup, view-model construction, and the render pipeline.
pub struct DocumentDispatcher<L, T, R, C> {
    lookup: Arc<L>,
    templates: Arc<T>,
    renderer: Arc<R>,
    converter: Arc<C>,
    settings: DocumentSettings,
    options: RenderOptions,
}

impl<L, T, R, C> DocumentDispatcher<L, T, R, C>
where
    L: ApplicationLookup + 'static,
    T: TemplateResolver + 'static,
    R: ViewRenderer + 'static,
    C: PdfConverter + 'static,
{
    pub fn new(
        lookup: Arc<L>,
        templates: Arc<T>,
        renderer: Arc<R>,
        converter: Arc<C>,
        settings: DocumentSettings,
    ) -> Self {
        Self {
            lookup,
            templates,
            renderer,
            converter,
            settings,
            options: RenderOptions::standard(),
        }
    }

    /// Generate the document bytes for an application.
    ///
    /// Returns `Ok(None)` when the application does not exist or its state has no
    /// document. Missing required data surfaces as [`DocumentError::InvalidDomainData`]
    /// and an unrepresentable portfolio total as [`DocumentError::PortfolioOverflow`].
    pub fn generate(
        &self,
        application_id: &ApplicationId,
        base_uri: &str,
    ) -> Result<Option<Vec<u8>>, DocumentError> {
        Ok(self
            .generate_document(application_id, base_uri)?
            .map(|document| document.bytes))
    }

    /// Same as [`generate`](Self::generate), keeping the converter's media type.
    pub fn generate_document(
        &self,
        application_id: &ApplicationId,
        base_uri: &str,
    ) -> Result<Option<GeneratedDocument>, DocumentError> {
        let Some(application) = self.lookup.find(application_id)? else {
            warn!(%application_id, "application not found, no document generated");
            return Ok(None);
        };

        let base_uri = normalize_base_uri(base_uri);

        let Some(view) = ViewModelBuilder::new(&self.settings).build(&application)? else {
            return Ok(None);
        };

        let url = format!("{base_uri}{}", self.templates.resolve(view.template()));
        debug!(
            %application_id,
            %url,
            template = view.template().logical_name(),
            "rendering document"
        );

        let markup = self.renderer.render(&url, &view)?;
        let document = self.converter.from_html(&markup, &self.options)?;

        Ok(Some(GeneratedDocument {
            bytes: document.to_bytes(),
            media_type: document.media_type(),
        }))
    }
}

/// Strips exactly one trailing `/` so template fragments can be appended directly.
pub fn normalize_base_uri(base_uri: &str) -> &str {
    base_uri.strip_suffix('/').unwrap_or(base_uri)
}

/// Error raised by document generation.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    InvalidDomainData(#[from] InvalidDomainData),
    #[error(transparent)]
    PortfolioOverflow(#[from] PortfolioOverflow),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
