/// Append-only fill ledger keyed by locator

use crate::protocol::hour_bucket;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub quantity: u32,
    pub price: Decimal,
    pub hour: u64,
}

impl Fill {
    pub fn new(quantity: u32, price: Decimal, timestamp_ns: u64) -> Self {
        Fill {
            quantity,
            price,
            hour: hour_bucket(timestamp_ns),
        }
    }

    /// price * quantity
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FillLedger {
    // BTreeMap keeps locator iteration deterministic for output and tests
    fills: BTreeMap<u16, Vec<Fill>>,
    total: usize,
}

impl FillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_fill(&mut self, locator: u16, quantity: u32, price: Decimal, hour: u64) {
        self.fills.entry(locator).or_default().push(Fill {
            quantity,
            price,
            hour,
        });
        self.total += 1;
    }

    pub fn push(&mut self, locator: u16, fill: Fill) {
        self.append_fill(locator, fill.quantity, fill.price, fill.hour);
    }

    /// Fills for a locator in arrival order
    pub fn fills(&self, locator: u16) -> &[Fill] {
        self.fills.get(&locator).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &[Fill])> {
        self.fills.iter().map(|(&locator, fills)| (locator, fills.as_slice()))
    }

    pub fn locator_count(&self) -> usize {
        self.fills.len()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
