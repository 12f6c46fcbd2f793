use axum::{routing::post, Router};

pub mod system;
pub mod transactions;
pub mod valuation;

/// Router for all API endpoints (besides `/health`).
pub fn router() -> Router {
    Router::new()
        .route("/transactions/validate", post(transactions::validate_transaction))
        .nest("/valuation", valuation::router())
}
