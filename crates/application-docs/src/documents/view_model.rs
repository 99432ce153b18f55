use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::dispatcher::DocumentError;
use super::domain::{Application, ApplicationState, Fund, LegalEntity, Review};
use super::portfolio::{self, PortfolioOverflow, PortfolioSummary};
use super::review::ReviewMessage;
use super::validation::{self, RequiredFields, ValidatedApplication};
use crate::config::DocumentSettings;

/// Logical template names understood by the template resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemplateName {
    PendingApplication,
    ActivatedApplication,
    InReviewApplication,
}

impl TemplateName {
    pub const fn logical_name(self) -> &'static str {
        match self {
            Self::PendingApplication => "PendingApplication",
            Self::ActivatedApplication => "ActivatedApplication",
            Self::InReviewApplication => "InReviewApplication",
        }
    }
}

/// Fields every document variant shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    pub reference_number: String,
    pub state: &'static str,
    pub full_name: String,
    pub applied_on: NaiveDate,
    pub support_email: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingViewModel {
    #[serde(flatten)]
    pub header: DocumentHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivatedViewModel {
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub legal_entity: Option<LegalEntity>,
    pub portfolio_funds: Vec<Fund>,
    pub portfolio_total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InReviewViewModel {
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub legal_entity: Option<LegalEntity>,
    pub portfolio_funds: Vec<Fund>,
    pub portfolio_total_amount: Decimal,
    pub in_review_message: &'static str,
    pub in_review_information: Review,
}

/// Fully validated data handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ViewModel {
    Pending(PendingViewModel),
    Activated(ActivatedViewModel),
    InReview(InReviewViewModel),
}

impl ViewModel {
    pub const fn template(&self) -> TemplateName {
        match self {
            Self::Pending(_) => TemplateName::PendingApplication,
            Self::Activated(_) => TemplateName::ActivatedApplication,
            Self::InReview(_) => TemplateName::InReviewApplication,
        }
    }

    pub fn header(&self) -> &DocumentHeader {
        match self {
            Self::Pending(view) => &view.header,
            Self::Activated(view) => &view.header,
            Self::InReview(view) => &view.header,
        }
    }
}

/// Per-state handler selected for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateHandler {
    Pending,
    Activated,
    InReview,
    Unsupported,
}

impl StateHandler {
    const fn for_state(state: ApplicationState) -> Self {
        match state {
            ApplicationState::Pending => Self::Pending,
            ApplicationState::Activated => Self::Activated,
            ApplicationState::InReview => Self::InReview,
            ApplicationState::Other => Self::Unsupported,
        }
    }
}

/// Builds the state-specific view model for an application.
pub struct ViewModelBuilder<'a> {
    settings: &'a DocumentSettings,
}

impl<'a> ViewModelBuilder<'a> {
    pub fn new(settings: &'a DocumentSettings) -> Self {
        Self { settings }
    }

    /// Returns `Ok(None)` when the application's state has no document.
    pub fn build(&self, application: &Application) -> Result<Option<ViewModel>, DocumentError> {
        let handler = StateHandler::for_state(application.state);
        debug!(application_id = %application.id, ?handler, "building view model");

        let view = match handler {
            StateHandler::Pending => self.pending(application)?,
            StateHandler::Activated => self.activated(application)?,
            StateHandler::InReview => self.in_review(application)?,
            StateHandler::Unsupported => {
                warn!(
                    application_id = %application.id,
                    state = ?application.state,
                    "no document template for application state"
                );
                return Ok(None);
            }
        };

        Ok(Some(view))
    }

    fn pending(&self, application: &Application) -> Result<ViewModel, DocumentError> {
        let validated = validation::validate(application, RequiredFields::PENDING)?;

        Ok(ViewModel::Pending(PendingViewModel {
            header: self.header(&validated),
        }))
    }

    fn activated(&self, application: &Application) -> Result<ViewModel, DocumentError> {
        let validated = validation::validate(application, RequiredFields::ACTIVATED)?;
        let PortfolioSummary {
            funds,
            total_amount,
        } = self.portfolio(application)?;

        Ok(ViewModel::Activated(ActivatedViewModel {
            header: self.header(&validated),
            legal_entity: validated.legal_entity.cloned(),
            portfolio_funds: funds,
            portfolio_total_amount: total_amount,
        }))
    }

    fn in_review(&self, application: &Application) -> Result<ViewModel, DocumentError> {
        let validated = validation::validate_in_review(application)?;
        let review = validated.current_review;
        let PortfolioSummary {
            funds,
            total_amount,
        } = self.portfolio(application)?;

        Ok(ViewModel::InReview(InReviewViewModel {
            header: self.header(&validated),
            legal_entity: validated.legal_entity.cloned(),
            portfolio_funds: funds,
            portfolio_total_amount: total_amount,
            in_review_message: ReviewMessage::select(&review.reason).text(),
            in_review_information: review.clone(),
        }))
    }

    fn portfolio(&self, application: &Application) -> Result<PortfolioSummary, PortfolioOverflow> {
        portfolio::summarize(&application.products, self.settings.tax_rate).map_err(|err| {
            warn!(
                application_id = %application.id,
                fund = %err.fund,
                "portfolio total is out of range"
            );
            err
        })
    }

    fn header<R>(&self, validated: &ValidatedApplication<'_, R>) -> DocumentHeader {
        let application = validated.application;
        DocumentHeader {
            reference_number: application.reference_number.clone(),
            state: application.state.label(),
            full_name: validated.person.full_name(),
            applied_on: application.applied_on,
            support_email: self.settings.support_email.clone(),
            signature: self.settings.signature.clone(),
        }
    }
}
