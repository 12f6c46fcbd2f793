//! HTTP API: stateless valuation endpoints over the engine.
//!
//! Every request carries its own catalog + ledger snapshot; nothing is stored
//! between requests.

pub mod app;
pub mod config;
