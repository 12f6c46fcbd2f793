//! Report builder: one valuation row per catalog product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use stockval_core::ProductId;
use stockval_inventory::Transaction;
use stockval_products::Product;

use crate::error::ValuationError;
use crate::ledger::{LedgerIndex, OrderedLedger};
use crate::method::{OverdrawPolicy, ValuationMethod};
use crate::strategy::StockPosition;

/// Output row: remaining stock of one product under one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_on_hand: u64,
    pub total_value: Decimal,
    /// `total_value / quantity_on_hand`, or 0 when nothing is on hand.
    pub unit_value: Decimal,
    pub method: ValuationMethod,
    /// Units the ledger tried to issue beyond what was on hand. Non-zero means
    /// the ledger is inconsistent (more sold than ever produced).
    pub shortfall: u64,
}

fn unit_value(quantity: u64, value: Decimal) -> Result<Decimal, ValuationError> {
    if quantity == 0 {
        return Ok(Decimal::ZERO);
    }
    value
        .checked_div(Decimal::from(quantity))
        .ok_or_else(|| ValuationError::overflow("unit value"))
}

impl ValuationResult {
    fn from_position(
        product: &Product,
        method: ValuationMethod,
        position: StockPosition,
    ) -> Result<Self, ValuationError> {
        Ok(Self {
            product_id: product.id_typed().clone(),
            product_name: product.name().to_string(),
            quantity_on_hand: position.quantity,
            total_value: position.value,
            unit_value: unit_value(position.quantity, position.value)?,
            method,
            shortfall: position.shortfall,
        })
    }
}

/// Aggregates over a report (dashboard totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_value: Decimal,
    pub total_quantity: u64,
    pub total_shortfall: u64,
}

impl ReportTotals {
    pub fn from_rows(rows: &[ValuationResult]) -> Result<Self, ValuationError> {
        rows.iter().try_fold(Self::default(), |acc, row| {
            Ok(Self {
                total_value: acc
                    .total_value
                    .checked_add(row.total_value)
                    .ok_or_else(|| ValuationError::overflow("report total value"))?,
                total_quantity: acc
                    .total_quantity
                    .checked_add(row.quantity_on_hand)
                    .ok_or_else(|| ValuationError::overflow("report total quantity"))?,
                total_shortfall: acc.total_shortfall.saturating_add(row.shortfall),
            })
        })
    }
}

/// Value and unit value of one product under one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodValue {
    pub total_value: Decimal,
    pub unit_value: Decimal,
}

impl From<&ValuationResult> for MethodValue {
    fn from(row: &ValuationResult) -> Self {
        Self {
            total_value: row.total_value,
            unit_value: row.unit_value,
        }
    }
}

/// One product valued under all three methods.
///
/// Quantity and shortfall do not depend on the method, only the value does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodComparison {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_on_hand: u64,
    pub shortfall: u64,
    pub fifo: MethodValue,
    pub lifo: MethodValue,
    pub average: MethodValue,
}

/// Builds valuation reports.
///
/// Holds configuration only; every `build` call allocates its own working state,
/// so one builder can serve concurrent callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportBuilder {
    policy: OverdrawPolicy,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overdraw_policy(mut self, policy: OverdrawPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OverdrawPolicy {
        self.policy
    }

    /// Value every product in catalog order.
    pub fn build(
        &self,
        products: &[Product],
        transactions: &[Transaction],
        method: ValuationMethod,
    ) -> Result<Vec<ValuationResult>, ValuationError> {
        let index = LedgerIndex::build(transactions);
        self.build_indexed(products, &index, method)
    }

    fn build_indexed(
        &self,
        products: &[Product],
        index: &LedgerIndex<'_>,
        method: ValuationMethod,
    ) -> Result<Vec<ValuationResult>, ValuationError> {
        let empty = OrderedLedger::default();

        products
            .iter()
            .map(|product| {
                let ledger = index.get(product.id_typed()).unwrap_or(&empty);
                self.value_product(product, ledger, method)
            })
            .collect()
    }

    /// Value a single product from its already-ordered ledger.
    pub fn value_product(
        &self,
        product: &Product,
        ledger: &OrderedLedger<'_>,
        method: ValuationMethod,
    ) -> Result<ValuationResult, ValuationError> {
        let position = method.evaluate(ledger, self.policy)?;
        debug!(
            product_id = %product.id_typed(),
            %method,
            events = ledger.len(),
            quantity = position.quantity,
            value = %position.value,
            shortfall = position.shortfall,
            "valued product"
        );
        ValuationResult::from_position(product, method, position)
    }

    /// Value every product under FIFO, LIFO and AVERAGE side by side.
    pub fn compare(
        &self,
        products: &[Product],
        transactions: &[Transaction],
    ) -> Result<Vec<MethodComparison>, ValuationError> {
        let index = LedgerIndex::build(transactions);
        let fifo = self.build_indexed(products, &index, ValuationMethod::Fifo)?;
        let lifo = self.build_indexed(products, &index, ValuationMethod::Lifo)?;
        let average = self.build_indexed(products, &index, ValuationMethod::Average)?;

        Ok(fifo
            .into_iter()
            .zip(lifo)
            .zip(average)
            .map(|((f, l), a)| {
                debug_assert_eq!(f.quantity_on_hand, l.quantity_on_hand);
                debug_assert_eq!(f.quantity_on_hand, a.quantity_on_hand);
                MethodComparison {
                    fifo: MethodValue::from(&f),
                    lifo: MethodValue::from(&l),
                    average: MethodValue::from(&a),
                    quantity_on_hand: f.quantity_on_hand,
                    shortfall: f.shortfall,
                    product_name: f.product_name,
                    product_id: f.product_id,
                }
            })
            .collect())
    }
}

/// Value every product in catalog order under `method`, absorbing over-sells.
pub fn build_report(
    products: &[Product],
    transactions: &[Transaction],
    method: ValuationMethod,
) -> Result<Vec<ValuationResult>, ValuationError> {
    ReportBuilder::new().build(products, transactions, method)
}

/// [`ReportBuilder::compare`] with the default (absorbing) policy.
pub fn compare_methods(
    products: &[Product],
    transactions: &[Transaction],
) -> Result<Vec<MethodComparison>, ValuationError> {
    ReportBuilder::new().compare(products, transactions)
}
