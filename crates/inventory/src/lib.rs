//! Inventory ledger module.
//!
//! Stock-in (production) and stock-out (sales/shipment) events, validated at the
//! boundary so downstream valuation can assume well-formed input. Pure domain
//! logic (no IO, no HTTP, no storage).

pub mod transaction;

pub use transaction::{Transaction, TransactionDraft, TransactionError, TransactionType};
