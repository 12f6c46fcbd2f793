use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockval_core::DomainError;
use stockval_inventory::TransactionError;
use stockval_valuation::ValuationError;

pub fn valuation_error_to_response(err: ValuationError) -> axum::response::Response {
    match &err {
        ValuationError::Overdrawn { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "overdrawn", err.to_string())
        }
        ValuationError::ArithmeticOverflow(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "arithmetic_overflow",
            err.to_string(),
        ),
        ValuationError::UnknownMethod(_) | ValuationError::UnknownPolicy(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn transaction_error_to_response(
    index: Option<usize>,
    err: TransactionError,
) -> axum::response::Response {
    let message = match index {
        Some(i) => format!("transactions[{i}]: {err}"),
        None => err.to_string(),
    };
    json_error(StatusCode::BAD_REQUEST, "invalid_transaction", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
