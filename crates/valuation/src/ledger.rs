//! Ledger normalizer: one product's events in deterministic chronological order.
//!
//! Ordering is by calendar date only. Events sharing a date keep their ledger
//! insertion order (stable sort), so every strategy sees the same sequence.

use std::collections::HashMap;

use stockval_core::ProductId;
use stockval_inventory::Transaction;

/// Read-only, date-ordered view over one product's transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedLedger<'a> {
    events: Vec<&'a Transaction>,
}

impl<'a> OrderedLedger<'a> {
    fn from_insertion_order(mut events: Vec<&'a Transaction>) -> Self {
        // `sort_by_key` is stable: equal dates keep insertion order.
        events.sort_by_key(|tx| tx.date());
        Self { events }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        self.events.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a Transaction] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Filter `transactions` down to `product_id` and order them by date.
///
/// The input ledger is not touched; the result borrows from it.
pub fn normalize<'a>(transactions: &'a [Transaction], product_id: &ProductId) -> OrderedLedger<'a> {
    OrderedLedger::from_insertion_order(
        transactions
            .iter()
            .filter(|tx| tx.product_id() == product_id)
            .collect(),
    )
}

/// Whole-ledger index: every product's [`OrderedLedger`], built in one pass.
///
/// Equivalent to calling [`normalize`] once per product, without rescanning the
/// full ledger for each one.
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex<'a> {
    by_product: HashMap<&'a ProductId, OrderedLedger<'a>>,
}

impl<'a> LedgerIndex<'a> {
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut grouped: HashMap<&'a ProductId, Vec<&'a Transaction>> = HashMap::new();
        for tx in transactions {
            grouped.entry(tx.product_id()).or_default().push(tx);
        }

        let by_product = grouped
            .into_iter()
            .map(|(id, events)| (id, OrderedLedger::from_insertion_order(events)))
            .collect();

        Self { by_product }
    }

    /// Ordered events for one product; `None` if the product never appears.
    pub fn get(&self, product_id: &ProductId) -> Option<&OrderedLedger<'a>> {
        self.by_product.get(product_id)
    }

    /// Number of distinct products referenced by the ledger.
    pub fn product_count(&self) -> usize {
        self.by_product.len()
    }
}
