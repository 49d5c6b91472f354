/// Cumulative hourly VWAP
///
/// For each symbol, fills are grouped by hour bucket and the buckets are
/// walked in ascending order while carrying running notional and volume
/// totals. The value for an hour is the session-to-date VWAP as of the end of
/// that hour, not an isolated hourly average.

use crate::ledger::{Fill, FillLedger};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    #[error("locator {locator} has {fills} fills but no stock directory entry")]
    UnmappedSymbol { locator: u16, fills: usize },
}

/// Summed notional and volume for one hour bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketTotals {
    pub notional: Decimal,
    pub volume: u64,
}

/// Hour bucket -> cumulative VWAP. Serialises with the hour as a string key.
pub type VwapSeries = BTreeMap<u64, Decimal>;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VwapReport {
    series: BTreeMap<String, VwapSeries>,
    #[serde(skip)]
    unmapped: Vec<AggregateError>,
}

impl VwapReport {
    pub fn series(&self) -> &BTreeMap<String, VwapSeries> {
        &self.series
    }

    pub fn get(&self, symbol: &str) -> Option<&VwapSeries> {
        self.series.get(symbol)
    }

    /// Locators whose fills could not be attributed to a symbol
    pub fn unmapped(&self) -> &[AggregateError] {
        &self.unmapped
    }

    /// Fills left out of the report because their locator had no symbol
    pub fn unmapped_fills(&self) -> usize {
        self.unmapped
            .iter()
            .map(|AggregateError::UnmappedSymbol { fills, .. }| *fills)
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unmapped.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }
}

pub struct VwapAggregator;

impl VwapAggregator {
    /// Sum notional and volume per hour bucket
    pub fn bucket_totals(fills: &[Fill]) -> BTreeMap<u64, BucketTotals> {
        let mut buckets: BTreeMap<u64, BucketTotals> = BTreeMap::new();
        for fill in fills {
            let bucket = buckets.entry(fill.hour).or_default();
            bucket.notional += fill.notional();
            bucket.volume += u64::from(fill.quantity);
        }
        buckets
    }

    /// Cumulative VWAP per hour bucket for one symbol's fills
    pub fn cumulative(fills: &[Fill]) -> VwapSeries {
        let mut running_notional = Decimal::ZERO;
        let mut running_volume = 0u64;

        Self::bucket_totals(fills)
            .into_iter()
            .map(|(hour, totals)| {
                running_notional += totals.notional;
                running_volume += totals.volume;
                let vwap = if running_volume == 0 {
                    Decimal::ZERO
                } else {
                    (running_notional / Decimal::from(running_volume)).normalize()
                };
                (hour, vwap)
            })
            .collect()
    }

    /// Build the per-symbol report. Fills from every locator mapped to the same
    /// ticker are pooled into one series. Locators missing from the directory
    /// are collected as `UnmappedSymbol` instead of being emitted under a blank key.
    pub fn aggregate(ledger: &FillLedger, symbols: &HashMap<u16, String>) -> VwapReport {
        let mut report = VwapReport::default();
        let mut by_symbol: BTreeMap<&str, Vec<Fill>> = BTreeMap::new();

        for (locator, fills) in ledger.iter() {
            match symbols.get(&locator) {
                Some(symbol) => {
                    let pooled = by_symbol.entry(symbol.as_str()).or_default();
                    if !pooled.is_empty() {
                        tracing::debug!(locator, %symbol, "locator shares a ticker, pooling fills");
                    }
                    pooled.extend_from_slice(fills);
                }
                None => {
                    let err = AggregateError::UnmappedSymbol {
                        locator,
                        fills: fills.len(),
                    };
                    tracing::warn!("{}", err);
                    report.unmapped.push(err);
                }
            }
        }

        for (symbol, fills) in by_symbol {
            report.series.insert(symbol.to_string(), Self::cumulative(&fills));
        }

        report
    }
}
