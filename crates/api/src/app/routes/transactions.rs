use axum::{http::StatusCode, response::IntoResponse, Json};

use stockval_inventory::{Transaction, TransactionDraft};

use crate::app::errors;

/// Validate a transaction-entry payload and return the typed transaction.
///
/// Nothing is recorded: the ledger belongs to the caller.
pub async fn validate_transaction(Json(body): Json<TransactionDraft>) -> axum::response::Response {
    match Transaction::try_from(body) {
        Ok(tx) => (StatusCode::OK, Json(tx)).into_response(),
        Err(e) => errors::transaction_error_to_response(None, e),
    }
}
