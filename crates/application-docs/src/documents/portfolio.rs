use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Fund, Product};

/// Aggregate portfolio figures shown on activated and in-review documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub funds: Vec<Fund>,
    pub total_amount: Decimal,
}

/// Raised when a fund's net contribution or the running total leaves the decimal range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("portfolio total overflows at fund {fund}")]
pub struct PortfolioOverflow {
    pub fund: String,
}

/// Flattens every product's funds in order and sums their taxed net contributions.
///
/// The tax rate is applied to each fund before summation so the total always
/// matches the per-fund figures printed next to it.
pub fn summarize(
    products: &[Product],
    tax_rate: Decimal,
) -> Result<PortfolioSummary, PortfolioOverflow> {
    let funds: Vec<Fund> = products
        .iter()
        .flat_map(|product| product.funds.iter().cloned())
        .collect();

    let total_amount = funds.iter().try_fold(Decimal::ZERO, |total, fund| {
        fund.net_contribution(tax_rate)
            .and_then(|net| total.checked_add(net))
            .ok_or_else(|| PortfolioOverflow {
                fund: fund.name.clone(),
            })
    })?;

    Ok(PortfolioSummary {
        funds,
        total_amount,
    })
}
