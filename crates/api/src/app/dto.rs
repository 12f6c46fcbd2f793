use serde::{Deserialize, Serialize};

use stockval_inventory::{Transaction, TransactionDraft};
use stockval_products::{Catalog, Product, ProductRecord};
use stockval_valuation::{
    MethodComparison, OverdrawPolicy, ReportTotals, ValuationMethod, ValuationResult,
};

use crate::app::errors;
use crate::config::ApiConfig;

// -------------------------
// Request DTOs
// -------------------------

/// Catalog + ledger snapshot sent with every valuation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionDraft>,
    /// Defaults to AVERAGE (the dashboard's quick view).
    #[serde(default)]
    pub method: Option<ValuationMethod>,
    #[serde(default)]
    pub overdraw_policy: Option<OverdrawPolicy>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Validated inputs, ready for the engine.
#[derive(Debug)]
pub struct ValuationInputs {
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
    pub method: ValuationMethod,
    pub policy: OverdrawPolicy,
    pub top_n: usize,
}

impl ValuationRequest {
    /// Validate every record at the boundary; the engine assumes clean input.
    pub fn validate(self, config: &ApiConfig) -> Result<ValuationInputs, axum::response::Response> {
        let products = self
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(errors::domain_error_to_response)?;
        let products = Catalog::new(products)
            .map_err(errors::domain_error_to_response)?
            .into_products();

        let transactions = self
            .transactions
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                Transaction::try_from(draft)
                    .map_err(|e| errors::transaction_error_to_response(Some(i), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValuationInputs {
            products,
            transactions,
            method: self.method.unwrap_or(ValuationMethod::Average),
            policy: self.overdraw_policy.unwrap_or(config.overdraw_policy),
            top_n: self.top_n.unwrap_or(config.top_n),
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub method: ValuationMethod,
    pub overdraw_policy: OverdrawPolicy,
    pub rows: Vec<ValuationResult>,
    pub totals: ReportTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub overdraw_policy: OverdrawPolicy,
    pub rows: Vec<MethodComparison>,
}
