/// Mutable per-session state
///
/// Symbol directory (locator -> ticker), order price table (order id -> last
/// known price) and the market open/close markers. Owned by a single pipeline
/// run and updated strictly in stream order.

use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("execution references unknown order {0}")]
    UnknownOrder(u64),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    symbols: HashMap<u16, String>,
    orders: HashMap<u64, Decimal>,
    market_open: Option<u64>,
    market_close: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a locator to its ticker, replacing any earlier mapping
    pub fn record_symbol(&mut self, locator: u16, symbol: String) {
        if let Some(previous) = self.symbols.insert(locator, symbol) {
            tracing::debug!(locator, %previous, "stock directory entry replaced");
        }
    }

    pub fn symbol(&self, locator: u16) -> Option<&str> {
        self.symbols.get(&locator).map(String::as_str)
    }

    pub fn symbols(&self) -> &HashMap<u16, String> {
        &self.symbols
    }

    pub fn set_order_price(&mut self, order_id: u64, price: Decimal) {
        self.orders.insert(order_id, price);
    }

    pub fn lookup_order_price(&self, order_id: u64) -> Result<Decimal, SessionError> {
        self.orders
            .get(&order_id)
            .copied()
            .ok_or(SessionError::UnknownOrder(order_id))
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Record the first market-open marker; later ones are ignored
    pub fn mark_open(&mut self, timestamp: u64) -> bool {
        if self.market_open.is_some() {
            return false;
        }
        self.market_open = Some(timestamp);
        true
    }

    /// Record the first market-close marker; later ones are ignored
    pub fn mark_close(&mut self, timestamp: u64) -> bool {
        if self.market_close.is_some() {
            return false;
        }
        self.market_close = Some(timestamp);
        true
    }

    pub fn market_open(&self) -> Option<u64> {
        self.market_open
    }

    pub fn market_close(&self) -> Option<u64> {
        self.market_close
    }

    /// Fills are only recorded once market open has been seen
    pub fn is_open(&self) -> bool {
        self.market_open.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.market_close.is_some()
    }
}
