/// Decode-and-aggregate pipeline
///
/// Reads frames in stream order, decodes them, applies each event to the
/// session state and fill ledger, and stops at the market-close system event
/// or when the source runs dry. Per-message problems are counted and skipped;
/// only source failures and broken framing end the run early.

use crate::config::PipelineConfig;
use crate::decoder::{Decoder, Event, SystemEventCode};
use crate::ledger::{Fill, FillLedger};
use crate::reader::{FrameError, FrameReader};
use crate::session::Session;
use crate::stats::{ErrorKind, RunStats};
use crate::vwap::{VwapAggregator, VwapReport};
use std::io::Read;
use std::time::Instant;
use thiserror::Error;

/// Fatal conditions only; everything else is counted in `RunStats`
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("framing lost after {frames} frames: {source}")]
    Frame {
        frames: u64,
        #[source]
        source: FrameError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MarketClose,
    EndOfStream,
}

pub struct Pipeline {
    config: PipelineConfig,
    session: Session,
    ledger: FillLedger,
    stats: RunStats,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            config,
            session: Session::new(),
            ledger: FillLedger::new(),
            stats: RunStats::new(),
        }
    }

    /// Drain `source` until market close or end of stream
    pub fn run<R: Read>(&mut self, source: R) -> Result<StopReason, PipelineError> {
        let mut reader = FrameReader::with_policy(source, self.config.unknown_tags);
        let result = self.drain(&mut reader);
        self.stats
            .record_errors(ErrorKind::UnknownTag, reader.skipped_bytes());
        result
    }

    fn drain<R: Read>(&mut self, reader: &mut FrameReader<R>) -> Result<StopReason, PipelineError> {
        let mut batch_start = Instant::now();

        loop {
            let frame = match reader.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!(frames = self.stats.total_frames(), "end of stream");
                    return Ok(StopReason::EndOfStream);
                }
                Err(source) => {
                    return Err(PipelineError::Frame {
                        frames: self.stats.total_frames(),
                        source,
                    });
                }
            };

            self.stats.record_frame(frame.msg_type, frame.payload.len() + 1);

            match Decoder::decode(frame.msg_type, frame.payload) {
                Ok(event) => self.apply(event),
                Err(e) => {
                    tracing::debug!(
                        tag = %(frame.msg_type.tag() as char),
                        error = %e,
                        "malformed payload"
                    );
                    self.stats.record_error(ErrorKind::MalformedPayload);
                }
            }

            let frames = self.stats.total_frames();
            if self.config.progress_interval > 0 && frames % self.config.progress_interval == 0 {
                tracing::info!(
                    frames,
                    "progress: batch took {:.3}s",
                    batch_start.elapsed().as_secs_f64()
                );
                batch_start = Instant::now();
            }

            if self.session.is_closed() {
                return Ok(StopReason::MarketClose);
            }
        }
    }

    /// Apply one decoded event to session state and the ledger
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::SystemEvent { timestamp, code } => match code {
                SystemEventCode::MarketOpen => {
                    if self.session.mark_open(timestamp) {
                        tracing::info!(timestamp, "market open");
                    }
                }
                SystemEventCode::MarketClose => {
                    if self.session.mark_close(timestamp) {
                        tracing::info!(timestamp, "market close");
                    }
                }
                SystemEventCode::Other(_) => {}
            },

            Event::StockDirectory { locator, symbol } => {
                self.session.record_symbol(locator, symbol);
            }

            Event::AddOrder { order_id, price } => {
                self.session.set_order_price(order_id, price);
            }

            Event::OrderReplace { new_order_id, price } => {
                self.session.set_order_price(new_order_id, price);
            }

            Event::OrderExecuted {
                locator,
                timestamp,
                order_id,
                quantity,
            } => {
                if !self.session.is_open() {
                    self.stats.record_pre_open();
                    return;
                }
                match self.session.lookup_order_price(order_id) {
                    Ok(price) => self.ledger.push(locator, Fill::new(quantity, price, timestamp)),
                    Err(e) => {
                        tracing::debug!(locator, error = %e, "fill dropped");
                        self.stats.record_error(ErrorKind::UnknownOrder);
                    }
                }
            }

            Event::OrderExecutedWithPrice {
                locator,
                timestamp,
                quantity,
                price,
                printable,
            } => {
                if !self.session.is_open() {
                    self.stats.record_pre_open();
                } else if !printable {
                    self.stats.record_non_printable();
                } else {
                    self.ledger.push(locator, Fill::new(quantity, price, timestamp));
                }
            }

            Event::Trade {
                locator,
                timestamp,
                quantity,
                price,
            } => {
                if !self.session.is_open() {
                    self.stats.record_pre_open();
                } else {
                    self.ledger.push(locator, Fill::new(quantity, price, timestamp));
                }
            }

            Event::Ignored(_) => {}
        }
    }

    /// Compute the VWAP report from everything recorded so far
    pub fn report(&mut self) -> VwapReport {
        let report = VwapAggregator::aggregate(&self.ledger, self.session.symbols());
        self.stats
            .set_error_count(ErrorKind::UnmappedSymbol, report.unmapped_fills() as u64);
        report
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ledger(&self) -> &FillLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Cursor;

    const HOUR: u64 = crate::protocol::NANOS_PER_HOUR;

    #[test]
    fn test_fills_gated_until_open() {
        let mut pipeline = Pipeline::default();
        let trade = Event::Trade {
            locator: 1,
            timestamp: 9 * HOUR,
            quantity: 10,
            price: Decimal::new(5, 0),
        };

        pipeline.apply(trade.clone());
        assert!(pipeline.ledger().is_empty());
        assert_eq!(pipeline.stats().pre_open_discarded(), 1);

        pipeline.apply(Event::SystemEvent {
            timestamp: 9 * HOUR,
            code: SystemEventCode::MarketOpen,
        });
        pipeline.apply(trade);
        assert_eq!(pipeline.ledger().fills(1).len(), 1);
    }

    #[test]
    fn test_non_printable_not_recorded() {
        let mut pipeline = Pipeline::default();
        pipeline.apply(Event::SystemEvent {
            timestamp: 0,
            code: SystemEventCode::MarketOpen,
        });
        pipeline.apply(Event::OrderExecutedWithPrice {
            locator: 1,
            timestamp: HOUR,
            quantity: 10,
            price: Decimal::new(5, 0),
            printable: false,
        });
        assert!(pipeline.ledger().is_empty());
        assert_eq!(pipeline.stats().non_printable(), 1);
    }

    #[test]
    fn test_replace_sets_new_order_price() {
        let mut pipeline = Pipeline::default();
        pipeline.apply(Event::OrderReplace {
            new_order_id: 9,
            price: Decimal::new(42, 0),
        });
        assert_eq!(pipeline.session().lookup_order_price(9), Ok(Decimal::new(42, 0)));
    }

    #[test]
    fn test_empty_source() {
        let mut pipeline = Pipeline::default();
        let reason = pipeline.run(Cursor::new(Vec::new())).unwrap();
        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(pipeline.report().symbol_count(), 0);
    }
}
