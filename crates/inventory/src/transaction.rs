use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockval_core::{DomainError, Entity, ProductId, TransactionId};

/// Direction of a ledger event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Stock-in (production result).
    #[serde(rename = "IN", alias = "MASUK")]
    In,
    /// Stock-out (sale / shipment).
    #[serde(rename = "OUT", alias = "KELUAR")]
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("quantity must be positive (found {0})")]
    NonPositiveQuantity(i64),

    #[error("price per unit cannot be negative (found {0})")]
    NegativePrice(Decimal),

    #[error("malformed transaction date: {0:?}")]
    MalformedDate(String),
}

impl From<TransactionError> for DomainError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InvalidId(msg) => DomainError::InvalidId(msg),
            other => DomainError::Validation(other.to_string()),
        }
    }
}

/// Untyped transaction payload, as assembled by an entry form or import.
///
/// Nothing here is trusted. Convert with `Transaction::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub product_id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: i64,
    #[serde(alias = "price")]
    pub price_per_unit: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Immutable ledger event.
///
/// For IN events `price_per_unit` is the cost basis of the batch. For OUT events it
/// is nominally the selling price and takes no part in valuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TransactionDraft")]
pub struct Transaction {
    id: TransactionId,
    product_id: ProductId,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: TransactionType,
    quantity: u64,
    price_per_unit: Decimal,
    reference: String,
}

impl Transaction {
    /// Build a transaction from already-typed parts.
    ///
    /// Rejects a zero quantity and a negative price; the type system covers the rest.
    pub fn new(
        id: TransactionId,
        product_id: ProductId,
        date: NaiveDate,
        kind: TransactionType,
        quantity: u64,
        price_per_unit: Decimal,
        reference: impl Into<String>,
    ) -> Result<Self, TransactionError> {
        if quantity == 0 {
            return Err(TransactionError::NonPositiveQuantity(0));
        }
        if price_per_unit.is_sign_negative() && !price_per_unit.is_zero() {
            return Err(TransactionError::NegativePrice(price_per_unit));
        }
        Ok(Self {
            id,
            product_id,
            date,
            kind,
            quantity,
            price_per_unit,
            reference: reference.into(),
        })
    }

    pub fn id_typed(&self) -> &TransactionId {
        &self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn is_in(&self) -> bool {
        self.kind == TransactionType::In
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price_per_unit(&self) -> Decimal {
        self.price_per_unit
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (reduced to its UTC date).
fn parse_ledger_date(raw: &str) -> Result<NaiveDate, TransactionError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc().date())
        .map_err(|_| TransactionError::MalformedDate(raw.to_string()))
}

impl TryFrom<TransactionDraft> for Transaction {
    type Error = TransactionError;

    fn try_from(draft: TransactionDraft) -> Result<Self, Self::Error> {
        let id = match draft.id {
            Some(raw) => TransactionId::new(raw)
                .map_err(|e| TransactionError::InvalidId(e.to_string()))?,
            None => TransactionId::generate(),
        };
        let product_id = ProductId::new(draft.product_id)
            .map_err(|e| TransactionError::InvalidId(e.to_string()))?;
        if draft.quantity <= 0 {
            return Err(TransactionError::NonPositiveQuantity(draft.quantity));
        }
        let date = parse_ledger_date(&draft.date)?;

        Transaction::new(
            id,
            product_id,
            date,
            draft.kind,
            draft.quantity as u64,
            draft.price_per_unit,
            draft.reference.unwrap_or_default(),
        )
    }
}

impl From<Transaction> for TransactionDraft {
    fn from(tx: Transaction) -> Self {
        Self {
            id: Some(tx.id.into()),
            product_id: tx.product_id.into(),
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind,
            // Quantities above i64::MAX never pass validation in the first place.
            quantity: i64::try_from(tx.quantity).unwrap_or(i64::MAX),
            price_per_unit: tx.price_per_unit,
            reference: Some(tx.reference),
        }
    }
}
