/// Synthetic ITCH session generator
///
/// Writes a raw (uncompressed) session: directory entries, market open, a mix
/// of adds, replaces, executions and trades spread over the trading day, then
/// market close. Useful for running the CLI and for benchmarking by hand.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use byteorder::{BigEndian, ByteOrder};
use rand::Rng;

const NANOS_PER_HOUR: u64 = 3_600_000_000_000;
const SYMBOLS: [&str; 4] = ["AAPL", "MSFT", "ZVZZT", "QQQ"];

fn frame(tag: u8, payload_len: usize, locator: u16, timestamp: u64) -> Vec<u8> {
    let mut msg = vec![0u8; 1 + payload_len];
    msg[0] = tag;
    BigEndian::write_u16(&mut msg[1..3], locator);
    BigEndian::write_u48(&mut msg[5..11], timestamp);
    msg
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/itch_session.bin".to_string()
    };

    let message_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(10000)
    } else {
        10000
    };

    let mut output = BufWriter::new(File::create(&output_path)?);
    let mut rng = rand::thread_rng();
    let mut live_orders: Vec<u64> = Vec::new();
    let mut next_order_id = 1000u64;

    println!("Generating {} messages to {}", message_count, output_path);

    for (i, symbol) in SYMBOLS.iter().enumerate() {
        let mut msg = frame(b'R', 38, i as u16 + 1, 0);
        let mut field = [b' '; 8];
        field[..symbol.len()].copy_from_slice(symbol.as_bytes());
        msg[11..19].copy_from_slice(&field);
        output.write_all(&msg)?;
    }

    let open_ts = 9 * NANOS_PER_HOUR + 30 * 60 * 1_000_000_000;
    let close_ts = 16 * NANOS_PER_HOUR;
    let mut open = frame(b'S', 11, 0, open_ts);
    open[11] = b'Q';
    output.write_all(&open)?;

    for i in 0..message_count {
        let locator = rng.gen_range(1..=SYMBOLS.len() as u16);
        let timestamp = open_ts + (close_ts - open_ts) / message_count as u64 * i as u64;
        let price = rng.gen_range(900_000u32..1_100_000);
        let qty = rng.gen_range(1u32..1000);

        match rng.gen_range(0u8..4) {
            0 => {
                // AddOrder
                let mut msg = frame(b'A', 35, locator, timestamp);
                BigEndian::write_u64(&mut msg[11..19], next_order_id);
                msg[19] = if rng.gen_bool(0.5) { b'B' } else { b'S' };
                BigEndian::write_u32(&mut msg[20..24], qty);
                BigEndian::write_u32(&mut msg[32..36], price);
                live_orders.push(next_order_id);
                next_order_id += 1;
                output.write_all(&msg)?;
            }

            1 if !live_orders.is_empty() => {
                // OrderExecuted against a live order
                let order_id = live_orders[rng.gen_range(0..live_orders.len())];
                let mut msg = frame(b'E', 30, locator, timestamp);
                BigEndian::write_u64(&mut msg[11..19], order_id);
                BigEndian::write_u32(&mut msg[19..23], qty);
                output.write_all(&msg)?;
            }

            2 if !live_orders.is_empty() => {
                // OrderReplace
                let slot = rng.gen_range(0..live_orders.len());
                let mut msg = frame(b'U', 34, locator, timestamp);
                BigEndian::write_u64(&mut msg[11..19], live_orders[slot]);
                BigEndian::write_u64(&mut msg[19..27], next_order_id);
                BigEndian::write_u32(&mut msg[27..31], qty);
                BigEndian::write_u32(&mut msg[31..35], price);
                live_orders[slot] = next_order_id;
                next_order_id += 1;
                output.write_all(&msg)?;
            }

            _ => {
                // Non-displayed trade
                let mut msg = frame(b'P', 43, locator, timestamp);
                msg[19] = b'B';
                BigEndian::write_u32(&mut msg[20..24], qty);
                BigEndian::write_u32(&mut msg[32..36], price);
                output.write_all(&msg)?;
            }
        }

        if i % 1000 == 0 && i > 0 {
            println!("Generated {} messages", i);
        }
    }

    let mut close = frame(b'S', 11, 0, close_ts);
    close[11] = b'M';
    output.write_all(&close)?;
    output.flush()?;

    println!("Feed generation complete: {} messages", message_count);

    Ok(())
}
