//! Inventory valuation engine.
//!
//! Given a product catalog and a chronological ledger of stock-in / stock-out
//! events, compute quantity on hand and its monetary value under FIFO, LIFO or
//! weighted average cost.
//!
//! Pipeline: [`ledger`] (filter + stable date order) -> [`strategy`] (one costing
//! pass per product) -> [`report`] (one row per catalog product). Every call builds
//! fresh working state, so the engine is safe to call concurrently and repeatedly.

pub mod error;
pub mod layers;
pub mod ledger;
pub mod method;
pub mod narrative;
pub mod report;
pub mod strategy;
pub mod summary;

pub use error::ValuationError;
pub use layers::{ConsumeFrom, CostLayer, CostLayers};
pub use ledger::{normalize, LedgerIndex, OrderedLedger};
pub use method::{OverdrawPolicy, ValuationMethod};
pub use narrative::{NarrativeContext, NarrativeProduct, NarrativeRow};
pub use report::{
    build_report, compare_methods, MethodComparison, MethodValue, ReportBuilder, ReportTotals,
    ValuationResult,
};
pub use strategy::{
    average, fifo, lifo, run, CostingStrategy, FifoLayers, LifoLayers, StockPosition,
    WeightedAverage,
};
pub use summary::{InventorySummary, LowStockItem, DEFAULT_TOP_N};
