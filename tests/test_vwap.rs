/// Cumulative VWAP properties over randomly generated fills

use itch_vwap::{Fill, VwapAggregator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn random_fills(rng: &mut StdRng, count: usize) -> Vec<Fill> {
    (0..count)
        .map(|_| Fill {
            quantity: rng.gen_range(0u32..5000),
            price: Decimal::new(rng.gen_range(1i64..2_000_000), 4),
            hour: rng.gen_range(0u64..24),
        })
        .collect()
}

#[test]
fn test_cumulative_sums_monotonic() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let count = rng.gen_range(1usize..300);
        let fills = random_fills(&mut rng, count);
        let buckets = VwapAggregator::bucket_totals(&fills);
        let series = VwapAggregator::cumulative(&fills);

        assert_eq!(
            series.keys().collect::<Vec<_>>(),
            buckets.keys().collect::<Vec<_>>()
        );

        let mut prev_volume = 0u64;
        let mut prev_notional = Decimal::ZERO;
        let mut volume = 0u64;
        let mut notional = Decimal::ZERO;
        for (hour, totals) in &buckets {
            volume += totals.volume;
            notional += totals.notional;
            assert!(volume >= prev_volume);
            assert!(notional >= prev_notional);

            let expected = if volume == 0 {
                Decimal::ZERO
            } else {
                (notional / Decimal::from(volume)).normalize()
            };
            assert_eq!(series[hour], expected, "hour {}", hour);

            prev_volume = volume;
            prev_notional = notional;
        }
    }
}

#[test]
fn test_vwap_within_price_range_to_date() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..200 {
        let count = rng.gen_range(1usize..300);
        let fills = random_fills(&mut rng, count);
        let series = VwapAggregator::cumulative(&fills);

        for (&hour, &vwap) in &series {
            let to_date: Vec<&Fill> = fills
                .iter()
                .filter(|f| f.hour <= hour && f.quantity > 0)
                .collect();

            if to_date.is_empty() {
                assert_eq!(vwap, Decimal::ZERO, "hour {} has no volume", hour);
                continue;
            }

            let low = to_date.iter().map(|f| f.price).min().unwrap();
            let high = to_date.iter().map(|f| f.price).max().unwrap();
            assert!(
                low <= vwap && vwap <= high,
                "hour {}: {} not in [{}, {}]",
                hour,
                vwap,
                low,
                high
            );
        }
    }
}

#[test]
fn test_arrival_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(3);
    let fills = random_fills(&mut rng, 500);

    let mut reversed = fills.clone();
    reversed.reverse();

    assert_eq!(
        VwapAggregator::cumulative(&fills),
        VwapAggregator::cumulative(&reversed)
    );
}
