//! Structured context handed to the external narrative summarizer.
//!
//! The engine only shapes the data; generating text is someone else's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockval_products::Product;

use crate::method::ValuationMethod;
use crate::report::ValuationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeProduct {
    pub name: String,
    pub min_stock: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRow {
    pub product: String,
    pub qty: u64,
    pub total_value: Decimal,
    pub method: ValuationMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContext {
    pub products: Vec<NarrativeProduct>,
    pub valuation_summary: Vec<NarrativeRow>,
    pub recent_transactions_count: usize,
    pub date: DateTime<Utc>,
}

impl NarrativeContext {
    pub fn new(
        products: &[Product],
        transaction_count: usize,
        report: &[ValuationResult],
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            products: products
                .iter()
                .map(|p| NarrativeProduct {
                    name: p.name().to_string(),
                    min_stock: p.min_stock(),
                })
                .collect(),
            valuation_summary: report
                .iter()
                .map(|r| NarrativeRow {
                    product: r.product_name.clone(),
                    qty: r.quantity_on_hand,
                    total_value: r.total_value,
                    method: r.method,
                })
                .collect(),
            recent_transactions_count: transaction_count,
            date: as_of,
        }
    }
}
