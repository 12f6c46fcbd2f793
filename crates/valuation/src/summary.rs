//! Dashboard-level digest of a valuation report.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_core::ProductId;
use stockval_products::Product;

use crate::error::ValuationError;
use crate::method::ValuationMethod;
use crate::report::{ReportTotals, ValuationResult};

pub const DEFAULT_TOP_N: usize = 10;

/// A product whose stock is at or below its reorder threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_on_hand: u64,
    pub min_stock: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub method: ValuationMethod,
    pub total_value: Decimal,
    pub total_quantity: u64,
    pub total_shortfall: u64,
    pub product_count: usize,
    pub transaction_count: usize,
    /// Catalog order.
    pub low_stock: Vec<LowStockItem>,
    /// Highest `total_value` first; ties keep catalog order.
    pub top_by_value: Vec<ValuationResult>,
}

impl InventorySummary {
    pub fn from_report(
        method: ValuationMethod,
        products: &[Product],
        transaction_count: usize,
        report: &[ValuationResult],
        top_n: usize,
    ) -> Result<Self, ValuationError> {
        let totals = ReportTotals::from_rows(report)?;

        let thresholds: HashMap<&ProductId, u64> = products
            .iter()
            .map(|p| (p.id_typed(), p.min_stock()))
            .collect();

        let low_stock = report
            .iter()
            .filter_map(|row| {
                let min_stock = *thresholds.get(&row.product_id)?;
                (row.quantity_on_hand <= min_stock).then(|| LowStockItem {
                    product_id: row.product_id.clone(),
                    product_name: row.product_name.clone(),
                    quantity_on_hand: row.quantity_on_hand,
                    min_stock,
                })
            })
            .collect();

        let mut top_by_value = report.to_vec();
        top_by_value.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        top_by_value.truncate(top_n);

        Ok(Self {
            method,
            total_value: totals.total_value,
            total_quantity: totals.total_quantity,
            total_shortfall: totals.total_shortfall,
            product_count: report.len(),
            transaction_count,
            low_stock,
            top_by_value,
        })
    }
}
