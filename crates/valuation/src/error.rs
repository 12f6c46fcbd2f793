use thiserror::Error;

use stockval_core::{ProductId, TransactionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValuationError {
    /// An OUT event asked for more units than were on hand (strict mode only).
    #[error(
        "transaction {transaction_id} issues {requested} unit(s) of product {product_id} but only {available} are on hand"
    )]
    Overdrawn {
        product_id: ProductId,
        transaction_id: TransactionId,
        requested: u64,
        available: u64,
    },

    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("unknown valuation method: {0:?} (expected FIFO, LIFO or AVERAGE)")]
    UnknownMethod(String),

    #[error("unknown overdraw policy: {0:?} (expected absorb or reject)")]
    UnknownPolicy(String),
}

impl ValuationError {
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::ArithmeticOverflow(msg.into())
    }
}
