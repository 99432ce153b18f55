use serde::Serialize;

/// Canned explanation shown to applicants whose application is under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMessage {
    AddressVerification,
    BankVerification,
    SuspiciousActivity,
}

// Evaluated top to bottom; the first rule whose keyword appears in the reason wins.
const RULES: [(&str, ReviewMessage); 2] = [
    ("address", ReviewMessage::AddressVerification),
    ("bank", ReviewMessage::BankVerification),
];

impl ReviewMessage {
    /// Case-sensitive keyword match against a free-text review reason.
    pub fn select(reason: &str) -> Self {
        RULES
            .iter()
            .find(|(keyword, _)| reason.contains(keyword))
            .map(|(_, message)| *message)
            .unwrap_or(Self::SuspiciousActivity)
    }

    pub const fn text(self) -> &'static str {
        match self {
            Self::AddressVerification => {
                "We need to verify your address. Please upload a recent proof of address so we can continue processing your application."
            }
            Self::BankVerification => {
                "We need to verify your bank details. Please upload a recent bank statement so we can continue processing your application."
            }
            Self::SuspiciousActivity => {
                "We noticed unusual activity on your application. Please contact our support team so we can continue processing your application."
            }
        }
    }
}
