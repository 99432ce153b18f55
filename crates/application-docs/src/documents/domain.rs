use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state tracked on every application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    Pending,
    Activated,
    InReview,
    #[serde(other)]
    Other,
}

impl ApplicationState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Activated => "Activated",
            Self::InReview => "In Review",
            Self::Other => "Other",
        }
    }
}

/// Natural person owning the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Organizational applicant details, rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    pub name: String,
    pub registration_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Single fund position held inside a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    pub amount: Decimal,
    pub fees: Decimal,
}

impl Fund {
    /// Amount net of fees, taxed at `tax_rate`. `None` when the result overflows.
    pub fn net_contribution(&self, tax_rate: Decimal) -> Option<Decimal> {
        self.amount.checked_sub(self.fees)?.checked_mul(tax_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub funds: Vec<Fund>,
}

/// Open review on an application. Everything except `reason` is passed through to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reason: String,
    pub opened_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Application record as returned by the lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub state: ApplicationState,
    pub reference_number: String,
    pub applied_on: NaiveDate,
    #[serde(default)]
    pub person: Option<Person>,
    #[serde(default)]
    pub is_legal_entity: bool,
    #[serde(default)]
    pub legal_entity: Option<LegalEntity>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub current_review: Option<Review>,
}
