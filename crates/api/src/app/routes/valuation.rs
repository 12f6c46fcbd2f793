use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use stockval_valuation::{
    InventorySummary, NarrativeContext, ReportBuilder, ReportTotals,
};

use crate::app::{dto, errors};
use crate::config::ApiConfig;

pub fn router() -> Router {
    Router::new()
        .route("/report", post(report))
        .route("/compare", post(compare))
        .route("/summary", post(summary))
        .route("/narrative-context", post(narrative_context))
}

pub async fn report(
    Extension(config): Extension<Arc<ApiConfig>>,
    Json(body): Json<dto::ValuationRequest>,
) -> axum::response::Response {
    let inputs = match body.validate(&config) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let builder = ReportBuilder::new().with_overdraw_policy(inputs.policy);
    let rows = match builder.build(&inputs.products, &inputs.transactions, inputs.method) {
        Ok(rows) => rows,
        Err(e) => return errors::valuation_error_to_response(e),
    };
    let totals = match ReportTotals::from_rows(&rows) {
        Ok(t) => t,
        Err(e) => return errors::valuation_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(dto::ReportResponse {
            method: inputs.method,
            overdraw_policy: inputs.policy,
            rows,
            totals,
        }),
    )
        .into_response()
}

pub async fn compare(
    Extension(config): Extension<Arc<ApiConfig>>,
    Json(body): Json<dto::ValuationRequest>,
) -> axum::response::Response {
    let inputs = match body.validate(&config) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let builder = ReportBuilder::new().with_overdraw_policy(inputs.policy);
    match builder.compare(&inputs.products, &inputs.transactions) {
        Ok(rows) => (
            StatusCode::OK,
            Json(dto::CompareResponse {
                overdraw_policy: inputs.policy,
                rows,
            }),
        )
            .into_response(),
        Err(e) => errors::valuation_error_to_response(e),
    }
}

pub async fn summary(
    Extension(config): Extension<Arc<ApiConfig>>,
    Json(body): Json<dto::ValuationRequest>,
) -> axum::response::Response {
    let inputs = match body.validate(&config) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let builder = ReportBuilder::new().with_overdraw_policy(inputs.policy);
    let result = builder
        .build(&inputs.products, &inputs.transactions, inputs.method)
        .and_then(|rows| {
            InventorySummary::from_report(
                inputs.method,
                &inputs.products,
                inputs.transactions.len(),
                &rows,
                inputs.top_n,
            )
        });

    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::valuation_error_to_response(e),
    }
}

pub async fn narrative_context(
    Extension(config): Extension<Arc<ApiConfig>>,
    Json(body): Json<dto::ValuationRequest>,
) -> axum::response::Response {
    let inputs = match body.validate(&config) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let builder = ReportBuilder::new().with_overdraw_policy(inputs.policy);
    match builder.build(&inputs.products, &inputs.transactions, inputs.method) {
        Ok(rows) => {
            let ctx = NarrativeContext::new(
                &inputs.products,
                inputs.transactions.len(),
                &rows,
                Utc::now(),
            );
            (StatusCode::OK, Json(ctx)).into_response()
        }
        Err(e) => errors::valuation_error_to_response(e),
    }
}
