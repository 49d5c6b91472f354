/// ITCH VWAP - hourly VWAP from a NASDAQ-style order-book feed
///
/// Offline decoder for a decompressed TotalView-ITCH style byte stream that
/// produces a per-symbol, session-to-date VWAP at the end of each hour.
/// - Tag-driven framing from a static payload length table
/// - Field decode of only the messages VWAP depends on
/// - Order price and symbol directory state kept in stream order
/// - Cumulative hourly VWAP in exact decimal arithmetic
/// - Per-kind counts of skipped messages for auditing a run

pub mod protocol;
pub mod config;
pub mod reader;
pub mod decoder;
pub mod session;
pub mod ledger;
pub mod vwap;
pub mod pipeline;
pub mod stats;
pub mod output;

pub use protocol::{MessageType, hour_bucket, price_from_fixed, NANOS_PER_HOUR};
pub use config::{PipelineConfig, UnknownTagPolicy};
pub use reader::{Frame, FrameReader, FrameError};
pub use decoder::{Decoder, DecodeError, Event, SystemEventCode};
pub use session::{Session, SessionError};
pub use ledger::{Fill, FillLedger};
pub use vwap::{AggregateError, BucketTotals, VwapAggregator, VwapReport, VwapSeries};
pub use pipeline::{Pipeline, PipelineError, StopReason};
pub use stats::{ErrorKind, RunStats};
pub use output::{write_report, write_report_file, OutputError};
