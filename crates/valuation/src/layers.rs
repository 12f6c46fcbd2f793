//! Cost layers (batches) for FIFO / LIFO.
//!
//! A `VecDeque` gives O(1) removal at either end, so consuming from the oldest
//! or the newest batch never shifts the remaining ones.

use std::collections::VecDeque;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValuationError;

/// A slice of stock acquired at one unit cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLayer {
    pub quantity: u64,
    pub unit_cost: Decimal,
    pub date: NaiveDate,
}

impl CostLayer {
    pub fn value(&self) -> Result<Decimal, ValuationError> {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_cost)
            .ok_or_else(|| ValuationError::overflow("layer quantity x unit cost"))
    }
}

/// Which end of the layer queue an issue draws from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConsumeFrom {
    Oldest,
    Newest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostLayers {
    layers: VecDeque<CostLayer>,
    on_hand: u64,
}

impl CostLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new batch at the tail (newest end).
    pub fn push(&mut self, layer: CostLayer) -> Result<(), ValuationError> {
        self.on_hand = self
            .on_hand
            .checked_add(layer.quantity)
            .ok_or_else(|| ValuationError::overflow("quantity on hand"))?;
        self.layers.push_back(layer);
        Ok(())
    }

    /// Remove `quantity` units from one end, splitting the last layer touched.
    ///
    /// Returns the number of units that could not be removed because the layers
    /// ran out (0 when stock was sufficient).
    pub fn consume(&mut self, quantity: u64, from: ConsumeFrom) -> u64 {
        let mut remaining = quantity;

        while remaining > 0 {
            let layer = match from {
                ConsumeFrom::Oldest => self.layers.front_mut(),
                ConsumeFrom::Newest => self.layers.back_mut(),
            };
            let Some(layer) = layer else {
                break;
            };

            if layer.quantity > remaining {
                layer.quantity -= remaining;
                self.on_hand -= remaining;
                remaining = 0;
            } else {
                remaining -= layer.quantity;
                self.on_hand -= layer.quantity;
                match from {
                    ConsumeFrom::Oldest => self.layers.pop_front(),
                    ConsumeFrom::Newest => self.layers.pop_back(),
                };
            }
        }

        remaining
    }

    pub fn on_hand(&self) -> u64 {
        self.on_hand
    }

    /// Sum of `quantity x unit_cost` over surviving layers.
    pub fn value(&self) -> Result<Decimal, ValuationError> {
        self.layers.iter().try_fold(Decimal::ZERO, |acc, layer| {
            acc.checked_add(layer.value()?)
                .ok_or_else(|| ValuationError::overflow("total layer value"))
        })
    }

    /// Layers from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CostLayer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
