/// End-to-end pipeline tests: crafted sessions in, VWAP report out

use byteorder::{BigEndian, ByteOrder};
use itch_vwap::{
    AggregateError, ErrorKind, Fill, Pipeline, PipelineConfig, PipelineError, StopReason,
    UnknownTagPolicy, NANOS_PER_HOUR,
};
use rust_decimal::Decimal;
use std::io::Cursor;

fn frame(tag: u8, payload_len: usize, locator: u16, timestamp: u64) -> Vec<u8> {
    let mut msg = vec![0u8; 1 + payload_len];
    msg[0] = tag;
    BigEndian::write_u16(&mut msg[1..3], locator);
    BigEndian::write_u48(&mut msg[5..11], timestamp);
    msg
}

fn system_event(code: u8, timestamp: u64) -> Vec<u8> {
    let mut msg = frame(b'S', 11, 0, timestamp);
    msg[11] = code;
    msg
}

fn market_open() -> Vec<u8> {
    system_event(b'Q', 9 * NANOS_PER_HOUR + 30 * 60 * 1_000_000_000)
}

fn market_close() -> Vec<u8> {
    system_event(b'M', 16 * NANOS_PER_HOUR)
}

fn stock_directory(locator: u16, symbol: &str) -> Vec<u8> {
    let mut msg = frame(b'R', 38, locator, 0);
    let mut field = [b' '; 8];
    field[..symbol.len()].copy_from_slice(symbol.as_bytes());
    msg[11..19].copy_from_slice(&field);
    msg
}

fn add_order(locator: u16, order_id: u64, price: u32) -> Vec<u8> {
    let mut msg = frame(b'A', 35, locator, 0);
    BigEndian::write_u64(&mut msg[11..19], order_id);
    msg[19] = b'B';
    BigEndian::write_u32(&mut msg[32..36], price);
    msg
}

fn order_executed(locator: u16, timestamp: u64, order_id: u64, quantity: u32) -> Vec<u8> {
    let mut msg = frame(b'E', 30, locator, timestamp);
    BigEndian::write_u64(&mut msg[11..19], order_id);
    BigEndian::write_u32(&mut msg[19..23], quantity);
    msg
}

fn executed_with_price(
    locator: u16,
    timestamp: u64,
    quantity: u32,
    printable: u8,
    price: u32,
) -> Vec<u8> {
    let mut msg = frame(b'C', 35, locator, timestamp);
    BigEndian::write_u32(&mut msg[19..23], quantity);
    msg[31] = printable;
    BigEndian::write_u32(&mut msg[32..36], price);
    msg
}

fn order_replace(locator: u16, old_id: u64, new_id: u64, price: u32) -> Vec<u8> {
    let mut msg = frame(b'U', 34, locator, 0);
    BigEndian::write_u64(&mut msg[11..19], old_id);
    BigEndian::write_u64(&mut msg[19..27], new_id);
    BigEndian::write_u32(&mut msg[31..35], price);
    msg
}

fn trade(locator: u16, timestamp: u64, quantity: u32, price: u32) -> Vec<u8> {
    let mut msg = frame(b'P', 43, locator, timestamp);
    BigEndian::write_u32(&mut msg[20..24], quantity);
    BigEndian::write_u32(&mut msg[32..36], price);
    msg
}

fn at_hour(hour: u64) -> u64 {
    hour * NANOS_PER_HOUR + 1_000
}

fn run(frames: &[Vec<u8>]) -> Pipeline {
    let buffer: Vec<u8> = frames.concat();
    let mut pipeline = Pipeline::default();
    pipeline.run(Cursor::new(buffer)).unwrap();
    pipeline
}

#[test]
fn test_add_then_execute() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        market_open(),
        add_order(1, 42, 123_400),
        order_executed(1, at_hour(9), 42, 100),
    ]);

    assert_eq!(
        pipeline.ledger().fills(1),
        &[Fill { quantity: 100, price: Decimal::new(1234, 2), hour: 9 }]
    );
    let report = pipeline.report();
    assert_eq!(report.get("ABCD").unwrap()[&9], Decimal::new(1234, 2));
}

#[test]
fn test_unknown_order_counted_not_zero_priced() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        market_open(),
        order_executed(1, at_hour(10), 999, 100),
    ]);

    assert!(pipeline.ledger().is_empty());
    assert_eq!(pipeline.stats().error_count(ErrorKind::UnknownOrder), 1);
    assert!(pipeline.report().get("ABCD").is_none());
}

#[test]
fn test_directory_keys_output() {
    let mut pipeline = run(&[
        stock_directory(7, "ABCD"),
        market_open(),
        trade(7, at_hour(11), 10, 100_000),
        trade(8, at_hour(11), 10, 100_000),
        trade(8, at_hour(12), 20, 100_000),
        trade(8, at_hour(12), 30, 100_000),
    ]);

    let report = pipeline.report();
    assert_eq!(report.series().keys().collect::<Vec<_>>(), vec!["ABCD"]);
    assert!(!report.series().contains_key(""));
    assert_eq!(
        report.unmapped(),
        &[AggregateError::UnmappedSymbol { locator: 8, fills: 3 }]
    );
    assert_eq!(pipeline.stats().error_count(ErrorKind::UnmappedSymbol), 3);
}

#[test]
fn test_locators_sharing_a_ticker() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        stock_directory(2, "ABCD"),
        market_open(),
        trade(1, at_hour(9), 100, 100_000),
        trade(2, at_hour(9), 100, 300_000),
    ]);

    let report = pipeline.report();
    assert_eq!(report.symbol_count(), 1);
    assert_eq!(report.get("ABCD").unwrap()[&9], Decimal::new(20, 0));
    assert_eq!(pipeline.stats().error_count(ErrorKind::UnmappedSymbol), 0);
}

#[test]
fn test_stops_at_market_close() {
    let mut frames = vec![
        stock_directory(1, "ABCD"),
        market_open(),
        trade(1, at_hour(10), 10, 100_000),
        market_close(),
    ];
    frames.push(trade(1, at_hour(17), 10, 900_000));
    // garbage that would fail framing if read
    frames.push(vec![b'P', 0, 0]);

    let buffer: Vec<u8> = frames.concat();
    let mut pipeline = Pipeline::default();
    let reason = pipeline.run(Cursor::new(buffer)).unwrap();

    assert_eq!(reason, StopReason::MarketClose);
    assert_eq!(pipeline.ledger().len(), 1);
    assert_eq!(pipeline.session().market_close(), Some(16 * NANOS_PER_HOUR));
}

#[test]
fn test_two_trades_same_hour() {
    let mut pipeline = run(&[
        stock_directory(3, "XYZ"),
        market_open(),
        trade(3, at_hour(12), 50, 100_000),
        trade(3, at_hour(12), 150, 200_000),
    ]);

    let report = pipeline.report();
    assert_eq!(report.get("XYZ").unwrap()[&12], Decimal::new(1750, 2));
}

#[test]
fn test_cumulative_volume_blend() {
    let mut pipeline = run(&[
        stock_directory(3, "XYZ"),
        market_open(),
        trade(3, at_hour(10), 100, 100_000),
        trade(3, at_hour(11), 300, 200_000),
        trade(3, at_hour(13), 100, 300_000),
    ]);

    let report = pipeline.report();
    let series = report.get("XYZ").unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[&10], Decimal::new(10, 0));
    // (1000 + 6000) / 400
    assert_eq!(series[&11], Decimal::new(1750, 2));
    // (7000 + 3000) / 500
    assert_eq!(series[&13], Decimal::new(20, 0));
}

#[test]
fn test_fills_before_open_discarded() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        add_order(1, 5, 100_000),
        order_executed(1, at_hour(4), 5, 10),
        trade(1, at_hour(4), 10, 100_000),
        executed_with_price(1, at_hour(4), 10, b'Y', 100_000),
        market_open(),
        order_executed(1, at_hour(10), 5, 10),
    ]);

    assert_eq!(pipeline.stats().pre_open_discarded(), 3);
    let report = pipeline.report();
    let series = report.get("ABCD").unwrap();
    assert_eq!(series.keys().copied().collect::<Vec<_>>(), vec![10]);
}

#[test]
fn test_executed_with_price_printable_only() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        market_open(),
        executed_with_price(1, at_hour(10), 10, b'N', 500_000),
        executed_with_price(1, at_hour(10), 30, b'Y', 100_000),
    ]);

    assert_eq!(pipeline.stats().non_printable(), 1);
    assert_eq!(pipeline.report().get("ABCD").unwrap()[&10], Decimal::new(10, 0));
}

#[test]
fn test_replace_then_execute_new_order() {
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        market_open(),
        add_order(1, 5, 100_000),
        order_replace(1, 5, 6, 110_000),
        order_executed(1, at_hour(10), 6, 10),
    ]);

    assert_eq!(pipeline.report().get("ABCD").unwrap()[&10], Decimal::new(11, 0));
}

#[test]
fn test_malformed_payload_skipped() {
    let bad = executed_with_price(1, at_hour(10), 10, b'?', 100_000);
    let mut pipeline = run(&[
        stock_directory(1, "ABCD"),
        market_open(),
        bad,
        trade(1, at_hour(10), 10, 100_000),
    ]);

    assert_eq!(pipeline.stats().error_count(ErrorKind::MalformedPayload), 1);
    assert_eq!(pipeline.ledger().len(), 1);
    assert!(pipeline.report().is_complete());
}

#[test]
fn test_unknown_tag_bytes_counted() {
    let mut pipeline = run(&[
        vec![b'z', b'!'],
        stock_directory(1, "ABCD"),
        vec![0x00],
        market_open(),
    ]);

    assert_eq!(pipeline.stats().error_count(ErrorKind::UnknownTag), 3);
    assert!(pipeline.session().is_open());
}

#[test]
fn test_strict_tags_abort_run() {
    let buffer: Vec<u8> = [stock_directory(1, "ABCD"), vec![b'z']].concat();
    let config = PipelineConfig::new().with_unknown_tags(UnknownTagPolicy::Fail);
    let mut pipeline = Pipeline::new(config);

    let result = pipeline.run(Cursor::new(buffer));
    assert!(matches!(result, Err(PipelineError::Frame { frames: 1, .. })));
    assert_eq!(pipeline.session().symbol(1), Some("ABCD"));
}

#[test]
fn test_truncated_frame_is_fatal() {
    let mut partial = trade(1, at_hour(10), 10, 100_000);
    partial.truncate(12);
    let buffer: Vec<u8> = [market_open(), partial].concat();
    let mut pipeline = Pipeline::default();
    assert!(pipeline.run(Cursor::new(buffer)).is_err());
}
