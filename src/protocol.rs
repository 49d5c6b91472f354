/// NASDAQ TotalView-ITCH style framing
///
/// Every frame is a single ASCII tag byte followed by a fixed-length payload.
/// There is no length prefix: the payload length is a function of the tag alone.
/// All integer fields are big-endian.
///
/// Common payload prefix (every message):
///   - stock_locate: u16 (2 bytes)
///   - tracking_number: u16 (2 bytes)
///   - timestamp: u48 (6 bytes) - nanoseconds since midnight

use rust_decimal::Decimal;

/// Offset of the first message-specific field, after locate/tracking/timestamp
pub const COMMON_PREFIX_SIZE: usize = 10;

/// Prices on the wire are u32 with four implied decimal places
pub const PRICE_SCALE: u32 = 4;

/// Nanoseconds in one hour
pub const NANOS_PER_HOUR: u64 = 3_600_000_000_000;

/// Width of the space-padded symbol field
pub const SYMBOL_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    SystemEvent,
    StockDirectory,
    StockTradingAction,
    RegShoRestriction,
    ParticipantPosition,
    MwcbDeclineLevel,
    MwcbStatus,
    IpoQuotingPeriod,
    LuldAuctionCollar,
    OperationalHalt,
    AddOrder,
    AddOrderMpid,
    OrderExecuted,
    OrderExecutedWithPrice,
    OrderCancel,
    OrderDelete,
    OrderReplace,
    Trade,
    CrossTrade,
    BrokenTrade,
    Noii,
    RetailPriceImprovement,
}

impl MessageType {
    pub const COUNT: usize = 22;

    pub const ALL: [MessageType; Self::COUNT] = [
        MessageType::SystemEvent,
        MessageType::StockDirectory,
        MessageType::StockTradingAction,
        MessageType::RegShoRestriction,
        MessageType::ParticipantPosition,
        MessageType::MwcbDeclineLevel,
        MessageType::MwcbStatus,
        MessageType::IpoQuotingPeriod,
        MessageType::LuldAuctionCollar,
        MessageType::OperationalHalt,
        MessageType::AddOrder,
        MessageType::AddOrderMpid,
        MessageType::OrderExecuted,
        MessageType::OrderExecutedWithPrice,
        MessageType::OrderCancel,
        MessageType::OrderDelete,
        MessageType::OrderReplace,
        MessageType::Trade,
        MessageType::CrossTrade,
        MessageType::BrokenTrade,
        MessageType::Noii,
        MessageType::RetailPriceImprovement,
    ];

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'S' => Some(MessageType::SystemEvent),
            b'R' => Some(MessageType::StockDirectory),
            b'H' => Some(MessageType::StockTradingAction),
            b'Y' => Some(MessageType::RegShoRestriction),
            b'L' => Some(MessageType::ParticipantPosition),
            b'V' => Some(MessageType::MwcbDeclineLevel),
            b'W' => Some(MessageType::MwcbStatus),
            b'K' => Some(MessageType::IpoQuotingPeriod),
            b'J' => Some(MessageType::LuldAuctionCollar),
            b'h' => Some(MessageType::OperationalHalt),
            b'A' => Some(MessageType::AddOrder),
            b'F' => Some(MessageType::AddOrderMpid),
            b'E' => Some(MessageType::OrderExecuted),
            b'C' => Some(MessageType::OrderExecutedWithPrice),
            b'X' => Some(MessageType::OrderCancel),
            b'D' => Some(MessageType::OrderDelete),
            b'U' => Some(MessageType::OrderReplace),
            b'P' => Some(MessageType::Trade),
            b'Q' => Some(MessageType::CrossTrade),
            b'B' => Some(MessageType::BrokenTrade),
            b'I' => Some(MessageType::Noii),
            b'N' => Some(MessageType::RetailPriceImprovement),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            MessageType::SystemEvent => b'S',
            MessageType::StockDirectory => b'R',
            MessageType::StockTradingAction => b'H',
            MessageType::RegShoRestriction => b'Y',
            MessageType::ParticipantPosition => b'L',
            MessageType::MwcbDeclineLevel => b'V',
            MessageType::MwcbStatus => b'W',
            MessageType::IpoQuotingPeriod => b'K',
            MessageType::LuldAuctionCollar => b'J',
            MessageType::OperationalHalt => b'h',
            MessageType::AddOrder => b'A',
            MessageType::AddOrderMpid => b'F',
            MessageType::OrderExecuted => b'E',
            MessageType::OrderExecutedWithPrice => b'C',
            MessageType::OrderCancel => b'X',
            MessageType::OrderDelete => b'D',
            MessageType::OrderReplace => b'U',
            MessageType::Trade => b'P',
            MessageType::CrossTrade => b'Q',
            MessageType::BrokenTrade => b'B',
            MessageType::Noii => b'I',
            MessageType::RetailPriceImprovement => b'N',
        }
    }

    /// Payload length in bytes, excluding the tag byte
    pub fn payload_len(self) -> usize {
        match self {
            MessageType::SystemEvent => 11,
            MessageType::StockDirectory => 38,
            MessageType::StockTradingAction => 24,
            MessageType::RegShoRestriction => 19,
            MessageType::ParticipantPosition => 25,
            MessageType::MwcbDeclineLevel => 34,
            MessageType::MwcbStatus => 11,
            MessageType::IpoQuotingPeriod => 27,
            MessageType::LuldAuctionCollar => 34,
            MessageType::OperationalHalt => 20,
            MessageType::AddOrder => 35,
            MessageType::AddOrderMpid => 39,
            MessageType::OrderExecuted => 30,
            MessageType::OrderExecutedWithPrice => 35,
            MessageType::OrderCancel => 22,
            MessageType::OrderDelete => 18,
            MessageType::OrderReplace => 34,
            MessageType::Trade => 43,
            MessageType::CrossTrade => 39,
            MessageType::BrokenTrade => 18,
            MessageType::Noii => 49,
            MessageType::RetailPriceImprovement => 19,
        }
    }

    /// Dense index into per-type counter arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Convert a wire price (scale 10^4) to a decimal
pub fn price_from_fixed(fixed: u32) -> Decimal {
    Decimal::new(i64::from(fixed), PRICE_SCALE)
}

/// Hour-of-day index for a nanoseconds-since-midnight timestamp
pub fn hour_bucket(timestamp_ns: u64) -> u64 {
    timestamp_ns / NANOS_PER_HOUR
}
