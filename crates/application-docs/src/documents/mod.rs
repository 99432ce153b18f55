//! State-specific document generation for financial applications.
//!
//! An application is resolved through [`ApplicationLookup`], validated for the
//! sub-entities its lifecycle state needs, turned into a [`ViewModel`], and handed
//! to the external render and conversion collaborators.

pub mod collaborators;
pub mod dispatcher;
pub mod domain;
pub mod portfolio;
pub mod review;
pub mod router;
pub mod validation;
pub mod view_model;

#[cfg(test)]
mod tests;

pub use collaborators::{
    ApplicationLookup, ConversionError, DocumentHandle, HeaderOptions, HeaderRepeat, LookupError,
    PageNumbering, PdfConverter, RenderError, RenderOptions, TemplateResolver, ViewRenderer,
};
pub use dispatcher::{normalize_base_uri, DocumentDispatcher, DocumentError, GeneratedDocument};
pub use domain::{
    Application, ApplicationId, ApplicationState, Fund, LegalEntity, Person, Product, Review,
};
pub use portfolio::{PortfolioOverflow, PortfolioSummary};
pub use review::ReviewMessage;
pub use router::document_router;
pub use validation::{
    InvalidDomainData, RequiredEntity, RequiredFields, ValidatedApplication,
};
pub use view_model::{
    ActivatedViewModel, DocumentHeader, InReviewViewModel, PendingViewModel, TemplateName,
    ViewModel, ViewModelBuilder,
};
