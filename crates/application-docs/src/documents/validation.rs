use serde::Serialize;
use tracing::warn;

use super::domain::{Application, ApplicationId, LegalEntity, Person, Review};

/// Sub-entities a document may depend on, in checking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredEntity {
    Person,
    LegalEntity,
    CurrentReview,
}

impl RequiredEntity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::LegalEntity => "LegalEntity",
            Self::CurrentReview => "CurrentReview",
        }
    }
}

/// Raised when an application is missing data its document cannot be built without.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("application {application_id} is missing required {}", .missing.label())]
pub struct InvalidDomainData {
    pub application_id: ApplicationId,
    pub missing: RequiredEntity,
}

/// Person and LegalEntity checks for a document. `Person` is always required.
///
/// The InReview set is [`RequiredFields::IN_REVIEW`] followed by
/// [`ValidatedApplication::with_current_review`], so the review comes back
/// non-optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields {
    /// Require `LegalEntity` whenever the application is flagged as a legal entity.
    pub legal_entity: bool,
}

impl RequiredFields {
    pub const PENDING: Self = Self {
        legal_entity: false,
    };

    pub const ACTIVATED: Self = Self { legal_entity: true };

    pub const IN_REVIEW: Self = Self { legal_entity: true };
}

/// Borrowed view of an application whose required entities are known to be present.
///
/// `R` is the current review slot: `()` until the review has been checked.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedApplication<'a, R = ()> {
    pub application: &'a Application,
    pub person: &'a Person,
    /// `Some` exactly when the application is a legal entity and the field set asked for it.
    pub legal_entity: Option<&'a LegalEntity>,
    pub current_review: R,
}

/// Checks Person, then LegalEntity, stopping at the first gap.
pub fn validate<'a>(
    application: &'a Application,
    required: RequiredFields,
) -> Result<ValidatedApplication<'a>, InvalidDomainData> {
    let person = present(application, application.person.as_ref(), RequiredEntity::Person)?;

    let legal_entity = if required.legal_entity && application.is_legal_entity {
        Some(present(
            application,
            application.legal_entity.as_ref(),
            RequiredEntity::LegalEntity,
        )?)
    } else {
        None
    };

    Ok(ValidatedApplication {
        application,
        person,
        legal_entity,
        current_review: (),
    })
}

/// Full InReview check: Person, then LegalEntity, then CurrentReview.
pub fn validate_in_review(
    application: &Application,
) -> Result<ValidatedApplication<'_, &Review>, InvalidDomainData> {
    validate(application, RequiredFields::IN_REVIEW)?.with_current_review()
}

impl<'a> ValidatedApplication<'a> {
    /// Runs the CurrentReview check last, after Person and LegalEntity passed.
    pub fn with_current_review(
        self,
    ) -> Result<ValidatedApplication<'a, &'a Review>, InvalidDomainData> {
        let current_review = present(
            self.application,
            self.application.current_review.as_ref(),
            RequiredEntity::CurrentReview,
        )?;

        Ok(ValidatedApplication {
            application: self.application,
            person: self.person,
            legal_entity: self.legal_entity,
            current_review,
        })
    }
}

fn present<'a, T>(
    application: &Application,
    value: Option<&'a T>,
    entity: RequiredEntity,
) -> Result<&'a T, InvalidDomainData> {
    value.ok_or_else(|| {
        warn!(
            application_id = %application.id,
            missing = entity.label(),
            "application is missing a required entity"
        );
        InvalidDomainData {
            application_id: application.id.clone(),
            missing: entity,
        }
    })
}
