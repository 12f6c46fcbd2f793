//! Costing strategies.
//!
//! All three strategies share one traversal: walk the ordered ledger, `receive`
//! on IN, `issue` on OUT. The driver owns the over-consumption policy, so a
//! strategy is only ever asked to issue units it actually holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use stockval_inventory::{Transaction, TransactionType};

use crate::error::ValuationError;
use crate::layers::{ConsumeFrom, CostLayer, CostLayers};
use crate::ledger::OrderedLedger;
use crate::method::{OverdrawPolicy, ValuationMethod};

/// Final (quantity, value) for one product after a full ledger pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    pub quantity: u64,
    pub value: Decimal,
    /// Units requested by OUT events beyond what was on hand (dropped).
    pub shortfall: u64,
}

/// Per-call working state of one costing convention.
///
/// `Default` must produce empty stock: the driver builds a fresh instance for
/// every ledger pass.
pub trait CostingStrategy: Default {
    const METHOD: ValuationMethod;

    /// Units currently held.
    fn on_hand(&self) -> u64;

    /// Book an IN event at its cost basis.
    fn receive(&mut self, tx: &Transaction) -> Result<(), ValuationError>;

    /// Remove `quantity` units. Callers guarantee `quantity <= on_hand()`.
    fn issue(&mut self, quantity: u64) -> Result<(), ValuationError>;

    /// Remaining (quantity, value).
    fn settle(&self) -> Result<(u64, Decimal), ValuationError>;
}

/// Run one strategy over an ordered ledger.
pub fn run<S: CostingStrategy>(
    ledger: &OrderedLedger<'_>,
    policy: OverdrawPolicy,
) -> Result<StockPosition, ValuationError> {
    let mut strategy = S::default();
    let mut shortfall: u64 = 0;

    for tx in ledger.iter() {
        match tx.kind() {
            TransactionType::In => strategy.receive(tx)?,
            TransactionType::Out => {
                let requested = tx.quantity();
                let available = strategy.on_hand();

                if requested > available {
                    if policy == OverdrawPolicy::Reject {
                        return Err(ValuationError::Overdrawn {
                            product_id: tx.product_id().clone(),
                            transaction_id: tx.id_typed().clone(),
                            requested,
                            available,
                        });
                    }
                    warn!(
                        product_id = %tx.product_id(),
                        transaction_id = %tx.id_typed(),
                        method = %S::METHOD,
                        requested,
                        available,
                        "stock-out exceeds quantity on hand; excess dropped"
                    );
                    shortfall = shortfall.saturating_add(requested - available);
                }

                let issued = requested.min(available);
                if issued > 0 {
                    strategy.issue(issued)?;
                }
            }
        }
    }

    let (quantity, value) = strategy.settle()?;
    Ok(StockPosition {
        quantity,
        // Residual rounding can only push the value below zero, never above.
        value: value.max(Decimal::ZERO),
        shortfall,
    })
}

#[derive(Debug, Clone, Default)]
pub struct FifoLayers {
    layers: CostLayers,
}

#[derive(Debug, Clone, Default)]
pub struct LifoLayers {
    layers: CostLayers,
}

fn push_layer(layers: &mut CostLayers, tx: &Transaction) -> Result<(), ValuationError> {
    layers.push(CostLayer {
        quantity: tx.quantity(),
        unit_cost: tx.price_per_unit(),
        date: tx.date(),
    })
}

impl CostingStrategy for FifoLayers {
    const METHOD: ValuationMethod = ValuationMethod::Fifo;

    fn on_hand(&self) -> u64 {
        self.layers.on_hand()
    }

    fn receive(&mut self, tx: &Transaction) -> Result<(), ValuationError> {
        push_layer(&mut self.layers, tx)
    }

    fn issue(&mut self, quantity: u64) -> Result<(), ValuationError> {
        let unmet = self.layers.consume(quantity, ConsumeFrom::Oldest);
        debug_assert_eq!(unmet, 0);
        Ok(())
    }

    fn settle(&self) -> Result<(u64, Decimal), ValuationError> {
        Ok((self.layers.on_hand(), self.layers.value()?))
    }
}

impl CostingStrategy for LifoLayers {
    const METHOD: ValuationMethod = ValuationMethod::Lifo;

    fn on_hand(&self) -> u64 {
        self.layers.on_hand()
    }

    fn receive(&mut self, tx: &Transaction) -> Result<(), ValuationError> {
        push_layer(&mut self.layers, tx)
    }

    fn issue(&mut self, quantity: u64) -> Result<(), ValuationError> {
        let unmet = self.layers.consume(quantity, ConsumeFrom::Newest);
        debug_assert_eq!(unmet, 0);
        Ok(())
    }

    fn settle(&self) -> Result<(u64, Decimal), ValuationError> {
        Ok((self.layers.on_hand(), self.layers.value()?))
    }
}

/// Weighted average cost: two running scalars, no layers.
///
/// The average itself is never stored; it is `value / quantity` at the moment
/// of each issue.
#[derive(Debug, Clone, Default)]
pub struct WeightedAverage {
    quantity: u64,
    value: Decimal,
}

impl CostingStrategy for WeightedAverage {
    const METHOD: ValuationMethod = ValuationMethod::Average;

    fn on_hand(&self) -> u64 {
        self.quantity
    }

    fn receive(&mut self, tx: &Transaction) -> Result<(), ValuationError> {
        let cost = Decimal::from(tx.quantity())
            .checked_mul(tx.price_per_unit())
            .ok_or_else(|| ValuationError::overflow("receipt quantity x unit cost"))?;
        self.value = self
            .value
            .checked_add(cost)
            .ok_or_else(|| ValuationError::overflow("running average value"))?;
        self.quantity = self
            .quantity
            .checked_add(tx.quantity())
            .ok_or_else(|| ValuationError::overflow("quantity on hand"))?;
        Ok(())
    }

    fn issue(&mut self, quantity: u64) -> Result<(), ValuationError> {
        if quantity >= self.quantity {
            // Issuing everything removes exactly the running value.
            self.quantity = 0;
            self.value = Decimal::ZERO;
            return Ok(());
        }

        let avg_cost = self
            .value
            .checked_div(Decimal::from(self.quantity))
            .ok_or_else(|| ValuationError::overflow("average unit cost"))?;
        let removed = Decimal::from(quantity)
            .checked_mul(avg_cost)
            .ok_or_else(|| ValuationError::overflow("issue quantity x average cost"))?;
        self.value = self
            .value
            .checked_sub(removed)
            .ok_or_else(|| ValuationError::overflow("running average value"))?;
        self.quantity -= quantity;
        Ok(())
    }

    fn settle(&self) -> Result<(u64, Decimal), ValuationError> {
        Ok((self.quantity, self.value))
    }
}

impl ValuationMethod {
    /// Value one product's ordered ledger with this method.
    pub fn evaluate(
        self,
        ledger: &OrderedLedger<'_>,
        policy: OverdrawPolicy,
    ) -> Result<StockPosition, ValuationError> {
        match self {
            ValuationMethod::Fifo => run::<FifoLayers>(ledger, policy),
            ValuationMethod::Lifo => run::<LifoLayers>(ledger, policy),
            ValuationMethod::Average => run::<WeightedAverage>(ledger, policy),
        }
    }
}

/// FIFO valuation, excess stock-outs absorbed.
pub fn fifo(ledger: &OrderedLedger<'_>) -> Result<StockPosition, ValuationError> {
    run::<FifoLayers>(ledger, OverdrawPolicy::Absorb)
}

/// LIFO valuation, excess stock-outs absorbed.
pub fn lifo(ledger: &OrderedLedger<'_>) -> Result<StockPosition, ValuationError> {
    run::<LifoLayers>(ledger, OverdrawPolicy::Absorb)
}

/// Weighted average valuation, excess stock-outs absorbed.
pub fn average(ledger: &OrderedLedger<'_>) -> Result<StockPosition, ValuationError> {
    run::<WeightedAverage>(ledger, OverdrawPolicy::Absorb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::normalize;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use stockval_core::{ProductId, TransactionId};

    fn tx(id: &str, day: u32, kind: TransactionType, quantity: u64, price: Decimal) -> Transaction {
        Transaction::new(
            TransactionId::new(id).unwrap(),
            ProductId::new("p1").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            kind,
            quantity,
            price,
            "",
        )
        .unwrap()
    }

    fn stock_in(id: &str, day: u32, quantity: u64, cost: Decimal) -> Transaction {
        tx(id, day, TransactionType::In, quantity, cost)
    }

    fn stock_out(id: &str, day: u32, quantity: u64) -> Transaction {
        // Selling price is deliberately absurd: it must never leak into valuation.
        tx(id, day, TransactionType::Out, quantity, dec!(999999))
    }

    fn value_all(ledger: &[Transaction], method: ValuationMethod) -> StockPosition {
        let ordered = normalize(ledger, &ProductId::new("p1").unwrap());
        method.evaluate(&ordered, OverdrawPolicy::Absorb).unwrap()
    }

    fn divergence_ledger() -> Vec<Transaction> {
        vec![
            stock_in("t1", 1, 10, dec!(100)),
            stock_in("t2", 2, 10, dec!(200)),
            stock_out("t3", 3, 10),
        ]
    }

    #[test]
    fn fifo_keeps_newest_costs() {
        let pos = value_all(&divergence_ledger(), ValuationMethod::Fifo);
        assert_eq!(pos.quantity, 10);
        assert_eq!(pos.value, dec!(2000));
        assert_eq!(pos.shortfall, 0);
    }

    #[test]
    fn lifo_keeps_oldest_costs() {
        let pos = value_all(&divergence_ledger(), ValuationMethod::Lifo);
        assert_eq!(pos.quantity, 10);
        assert_eq!(pos.value, dec!(1000));
    }

    #[test]
    fn average_smooths_costs() {
        let pos = value_all(&divergence_ledger(), ValuationMethod::Average);
        assert_eq!(pos.quantity, 10);
        assert_eq!(pos.value, dec!(1500));
    }

    #[test]
    fn over_sell_is_clamped_to_zero_under_every_method() {
        let ledger = vec![stock_in("t1", 1, 5, dec!(10)), stock_out("t2", 2, 8)];

        for method in ValuationMethod::ALL {
            let pos = value_all(&ledger, method);
            assert_eq!(pos.quantity, 0, "{method}");
            assert_eq!(pos.value, Decimal::ZERO, "{method}");
            assert_eq!(pos.shortfall, 3, "{method}");
        }
    }

    #[test]
    fn over_sell_is_rejected_in_strict_mode() {
        let ledger = vec![stock_in("t1", 1, 5, dec!(10)), stock_out("t2", 2, 8)];
        let ordered = normalize(&ledger, &ProductId::new("p1").unwrap());

        for method in ValuationMethod::ALL {
            let err = method.evaluate(&ordered, OverdrawPolicy::Reject).unwrap_err();
            assert_eq!(
                err,
                ValuationError::Overdrawn {
                    product_id: ProductId::new("p1").unwrap(),
                    transaction_id: TransactionId::new("t2").unwrap(),
                    requested: 8,
                    available: 5,
                }
            );
        }
    }

    #[test]
    fn stock_out_on_empty_stock_is_a_no_op() {
        let ledger = vec![
            stock_out("t1", 1, 4),
            stock_in("t2", 2, 6, dec!(20)),
        ];

        for method in ValuationMethod::ALL {
            let pos = value_all(&ledger, method);
            assert_eq!(pos.quantity, 6, "{method}");
            assert_eq!(pos.value, dec!(120), "{method}");
            assert_eq!(pos.shortfall, 4, "{method}");
        }
    }

    #[test]
    fn average_restarts_from_zero_after_depletion() {
        let ledger = vec![
            stock_in("t1", 1, 5, dec!(10)),
            stock_out("t2", 2, 8),
            stock_in("t3", 3, 2, dec!(30)),
        ];

        let pos = value_all(&ledger, ValuationMethod::Average);
        assert_eq!(pos.quantity, 2);
        assert_eq!(pos.value, dec!(60));
    }

    #[test]
    fn average_full_depletion_leaves_no_rounding_residue() {
        // 10 / 3 has no exact decimal form; issuing the last unit must still land on 0.
        let ledger = vec![
            stock_in("t1", 1, 1, dec!(10)),
            stock_in("t2", 1, 2, Decimal::ZERO),
            stock_out("t3", 2, 1),
            stock_out("t4", 3, 1),
            stock_out("t5", 4, 1),
        ];

        let pos = value_all(&ledger, ValuationMethod::Average);
        assert_eq!(pos.quantity, 0);
        assert_eq!(pos.value, Decimal::ZERO);
    }

    #[test]
    fn out_and_in_on_same_date_follow_insertion_order() {
        // Same-day IN then OUT: legitimately ends at exactly zero.
        let ledger = vec![stock_in("t1", 1, 5, dec!(10)), stock_out("t2", 1, 5)];
        for method in ValuationMethod::ALL {
            let pos = value_all(&ledger, method);
            assert_eq!((pos.quantity, pos.value, pos.shortfall), (0, Decimal::ZERO, 0));
        }

        // Same-day OUT inserted first: nothing on hand yet, so it is absorbed.
        let ledger = vec![stock_out("t1", 1, 5), stock_in("t2", 1, 5, dec!(10))];
        let pos = value_all(&ledger, ValuationMethod::Fifo);
        assert_eq!((pos.quantity, pos.value, pos.shortfall), (5, dec!(50), 5));
    }

    #[test]
    fn fifo_same_date_receipts_consume_in_insertion_order() {
        let cheap_first = vec![
            stock_in("a", 1, 10, dec!(100)),
            stock_in("b", 1, 10, dec!(200)),
            stock_out("c", 2, 10),
        ];
        let dear_first = vec![
            stock_in("b", 1, 10, dec!(200)),
            stock_in("a", 1, 10, dec!(100)),
            stock_out("c", 2, 10),
        ];

        assert_eq!(value_all(&cheap_first, ValuationMethod::Fifo).value, dec!(2000));
        assert_eq!(value_all(&dear_first, ValuationMethod::Fifo).value, dec!(1000));

        // Equal costs: insertion order makes no difference.
        let same_a = vec![
            stock_in("a", 1, 10, dec!(100)),
            stock_in("b", 1, 4, dec!(100)),
            stock_out("c", 2, 12),
        ];
        let same_b = vec![
            stock_in("b", 1, 4, dec!(100)),
            stock_in("a", 1, 10, dec!(100)),
            stock_out("c", 2, 12),
        ];
        assert_eq!(
            value_all(&same_a, ValuationMethod::Fifo),
            value_all(&same_b, ValuationMethod::Fifo)
        );
    }

    #[test]
    fn unsorted_ledger_is_valued_chronologically() {
        let ledger = vec![
            stock_out("t3", 3, 10),
            stock_in("t2", 2, 10, dec!(200)),
            stock_in("t1", 1, 10, dec!(100)),
        ];

        assert_eq!(value_all(&ledger, ValuationMethod::Fifo).value, dec!(2000));
        assert_eq!(value_all(&ledger, ValuationMethod::Lifo).value, dec!(1000));
    }

    #[test]
    fn free_function_contracts_match_method_dispatch() {
        let ledger = divergence_ledger();
        let ordered = normalize(&ledger, &ProductId::new("p1").unwrap());

        assert_eq!(fifo(&ordered).unwrap().value, dec!(2000));
        assert_eq!(lifo(&ordered).unwrap().value, dec!(1000));
        assert_eq!(average(&ordered).unwrap().value, dec!(1500));
    }

    #[test]
    fn empty_ledger_values_to_zero() {
        let ordered = OrderedLedger::default();
        for method in ValuationMethod::ALL {
            assert_eq!(
                method.evaluate(&ordered, OverdrawPolicy::Reject).unwrap(),
                StockPosition::default()
            );
        }
    }

    fn arb_events() -> impl Strategy<Value = Vec<(bool, u64, i64, u32)>> {
        // (is_in, quantity, cost in cents, day)
        prop::collection::vec((any::<bool>(), 1u64..500, 0i64..1_000_000, 1u32..28), 0..40)
    }

    fn build(events: &[(bool, u64, i64, u32)]) -> Vec<Transaction> {
        events
            .iter()
            .enumerate()
            .map(|(i, (is_in, q, cents, day))| {
                let kind = if *is_in { TransactionType::In } else { TransactionType::Out };
                tx(&format!("t{i}"), *day, kind, *q, Decimal::new(*cents, 2))
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: with no stock-outs every method holds every unit at full cost.
        #[test]
        fn receipts_only_conserve_quantity_and_cost(
            receipts in prop::collection::vec((1u64..500, 0i64..1_000_000, 1u32..28), 0..40)
        ) {
            let ledger = build(
                &receipts.iter().map(|(q, c, d)| (true, *q, *c, *d)).collect::<Vec<_>>(),
            );
            let qty: u64 = receipts.iter().map(|(q, _, _)| q).sum();
            let cost: Decimal = receipts
                .iter()
                .map(|(q, c, _)| Decimal::from(*q) * Decimal::new(*c, 2))
                .sum();

            for method in ValuationMethod::ALL {
                let pos = value_all(&ledger, method);
                prop_assert_eq!(pos.quantity, qty);
                prop_assert_eq!(pos.value, cost);
            }
        }

        /// Property: issuing exactly what was received leaves nothing behind.
        #[test]
        fn full_depletion_leaves_zero(
            receipts in prop::collection::vec((1u64..500, 0i64..1_000_000), 1..20)
        ) {
            let mut ledger: Vec<Transaction> = receipts
                .iter()
                .enumerate()
                .map(|(i, (q, c))| stock_in(&format!("in{i}"), 1, *q, Decimal::new(*c, 2)))
                .collect();
            // Issue in several uneven chunks after all receipts.
            let total: u64 = receipts.iter().map(|(q, _)| q).sum();
            let mut left = total;
            let mut i = 0;
            while left > 0 {
                let chunk = (left / 3).max(1);
                ledger.push(stock_out(&format!("out{i}"), 2, chunk));
                left -= chunk;
                i += 1;
            }

            for method in ValuationMethod::ALL {
                let pos = value_all(&ledger, method);
                prop_assert_eq!(pos.quantity, 0);
                prop_assert_eq!(pos.value, Decimal::ZERO);
                prop_assert_eq!(pos.shortfall, 0);
            }
        }

        /// Property: stock never goes negative and quantity is method-independent.
        #[test]
        fn balances_stay_non_negative(events in arb_events()) {
            let ledger = build(&events);
            let positions: Vec<_> = ValuationMethod::ALL
                .iter()
                .map(|m| value_all(&ledger, *m))
                .collect();

            for pos in &positions {
                prop_assert!(!pos.value.is_sign_negative() || pos.value.is_zero());
                prop_assert_eq!(pos.quantity, positions[0].quantity);
                prop_assert_eq!(pos.shortfall, positions[0].shortfall);
                if pos.quantity == 0 {
                    prop_assert_eq!(pos.value, Decimal::ZERO);
                }
            }
        }

        /// Property: layered value never exceeds quantity x the dearest receipt cost.
        #[test]
        fn layered_values_are_bounded_by_costs(events in arb_events()) {
            let ledger = build(&events);
            let max_cost = ledger
                .iter()
                .filter(|t| t.is_in())
                .map(|t| t.price_per_unit())
                .max()
                .unwrap_or(Decimal::ZERO);

            for method in [ValuationMethod::Fifo, ValuationMethod::Lifo] {
                let pos = value_all(&ledger, method);
                prop_assert!(pos.value <= Decimal::from(pos.quantity) * max_cost);
            }
        }
    }
}
