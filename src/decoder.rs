/// Per-message field decoder
///
/// Turns a (message type, payload) pair into an `Event`. Only the fields the
/// VWAP pipeline consumes are decoded; everything else in the payload is
/// skipped by offset. Message types that carry nothing of interest decode to
/// `Event::Ignored`.

use crate::protocol::*;
use byteorder::{BigEndian, ByteOrder};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload for '{tag}' has {have} bytes, layout needs {need}")]
    PayloadLength { tag: char, need: usize, have: usize },

    #[error("symbol field is not printable ASCII: {0:?}")]
    InvalidSymbol([u8; SYMBOL_WIDTH]),

    #[error("symbol field is blank")]
    BlankSymbol,

    #[error("printable flag must be 'Y' or 'N', got 0x{0:02x}")]
    InvalidPrintableFlag(u8),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventCode {
    /// 'Q' - start of market hours
    MarketOpen,
    /// 'M' - end of market hours
    MarketClose,
    /// Any other code (start/end of messages, system hours)
    Other(u8),
}

impl SystemEventCode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            b'Q' => SystemEventCode::MarketOpen,
            b'M' => SystemEventCode::MarketClose,
            other => SystemEventCode::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SystemEvent {
        timestamp: u64,
        code: SystemEventCode,
    },
    StockDirectory {
        locator: u16,
        symbol: String,
    },
    /// 'A' and 'F' both decode to this
    AddOrder {
        order_id: u64,
        price: Decimal,
    },
    OrderExecuted {
        locator: u16,
        timestamp: u64,
        order_id: u64,
        quantity: u32,
    },
    OrderExecutedWithPrice {
        locator: u16,
        timestamp: u64,
        quantity: u32,
        price: Decimal,
        printable: bool,
    },
    OrderReplace {
        new_order_id: u64,
        price: Decimal,
    },
    Trade {
        locator: u16,
        timestamp: u64,
        quantity: u32,
        price: Decimal,
    },
    Ignored(MessageType),
}

/// Stateless decoder
pub struct Decoder;

impl Decoder {
    /// Decode one payload. `payload` must be exactly `msg_type.payload_len()` bytes.
    pub fn decode(msg_type: MessageType, payload: &[u8]) -> DecodeResult<Event> {
        let need = msg_type.payload_len();
        if payload.len() != need {
            return Err(DecodeError::PayloadLength {
                tag: msg_type.tag() as char,
                need,
                have: payload.len(),
            });
        }

        let event = match msg_type {
            MessageType::SystemEvent => Event::SystemEvent {
                timestamp: timestamp(payload),
                code: SystemEventCode::from_u8(payload[10]),
            },

            MessageType::StockDirectory => Event::StockDirectory {
                locator: locator(payload),
                symbol: symbol(&payload[10..10 + SYMBOL_WIDTH])?,
            },

            // order ref @10, side @18, shares @19, stock @23, price @31 (F adds attribution @35)
            MessageType::AddOrder | MessageType::AddOrderMpid => Event::AddOrder {
                order_id: BigEndian::read_u64(&payload[10..18]),
                price: price_from_fixed(BigEndian::read_u32(&payload[31..35])),
            },

            // order ref @10, executed shares @18, match number @22
            MessageType::OrderExecuted => Event::OrderExecuted {
                locator: locator(payload),
                timestamp: timestamp(payload),
                order_id: BigEndian::read_u64(&payload[10..18]),
                quantity: BigEndian::read_u32(&payload[18..22]),
            },

            // ... as 'E', then printable @30, execution price @31
            MessageType::OrderExecutedWithPrice => Event::OrderExecutedWithPrice {
                locator: locator(payload),
                timestamp: timestamp(payload),
                quantity: BigEndian::read_u32(&payload[18..22]),
                printable: printable(payload[30])?,
                price: price_from_fixed(BigEndian::read_u32(&payload[31..35])),
            },

            // original ref @10, new ref @18, shares @26, price @30
            MessageType::OrderReplace => Event::OrderReplace {
                new_order_id: BigEndian::read_u64(&payload[18..26]),
                price: price_from_fixed(BigEndian::read_u32(&payload[30..34])),
            },

            // order ref @10, side @18, shares @19, stock @23, price @31, match @35
            MessageType::Trade => Event::Trade {
                locator: locator(payload),
                timestamp: timestamp(payload),
                quantity: BigEndian::read_u32(&payload[19..23]),
                price: price_from_fixed(BigEndian::read_u32(&payload[31..35])),
            },

            other => Event::Ignored(other),
        };

        Ok(event)
    }
}

fn locator(payload: &[u8]) -> u16 {
    BigEndian::read_u16(&payload[0..2])
}

fn timestamp(payload: &[u8]) -> u64 {
    BigEndian::read_u48(&payload[4..COMMON_PREFIX_SIZE])
}

fn symbol(raw: &[u8]) -> DecodeResult<String> {
    let mut field = [0u8; SYMBOL_WIDTH];
    field.copy_from_slice(raw);

    if !raw.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        return Err(DecodeError::InvalidSymbol(field));
    }
    // checked above: all bytes are ASCII
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidSymbol(field))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::BlankSymbol);
    }
    Ok(trimmed.to_string())
}

fn printable(flag: u8) -> DecodeResult<bool> {
    match flag {
        b'Y' => Ok(true),
        b'N' => Ok(false),
        other => Err(DecodeError::InvalidPrintableFlag(other)),
    }
}
