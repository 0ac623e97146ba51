use rust_decimal::Decimal;
use tracing::debug;

use crate::decimal::{parse_amount, round2, signed_delta, to_decimal, SignedAmount};
use crate::models::{Chart, ChartPoint, Summary, TransferEvent};
use crate::range::TimeRange;

/// Bucket `events` into the window of `range` ending at `now_ms` and build the
/// cumulative net-change series of `observed`.
///
/// Input order does not matter. Events before the window are ignored, events
/// past its end land in the last bucket, and malformed amounts count as zero.
pub fn aggregate(
    events: &[TransferEvent],
    observed: &str,
    decimals: i32,
    range: TimeRange,
    now_ms: i64,
) -> Chart {
    let window = range.window(now_ms);
    let mut deltas = vec![SignedAmount::ZERO; window.bucket_count];
    let mut applied = 0usize;

    for event in events {
        let Some(timestamp_ms) = event.timestamp_seconds.checked_mul(1000) else {
            continue;
        };
        let Some(index) = window.bucket_for(timestamp_ms) else {
            continue;
        };

        let delta = signed_delta(
            parse_amount(&event.raw_amount),
            &event.from,
            &event.to,
            observed,
        );
        if delta.is_zero() {
            continue;
        }

        deltas[index] += delta;
        applied += 1;
    }

    debug!(
        "Aggregated {} of {} transfers into {} buckets ({})",
        applied,
        events.len(),
        window.bucket_count,
        range
    );

    let mut running = SignedAmount::ZERO;
    let points: Vec<ChartPoint> = deltas
        .iter()
        .enumerate()
        .map(|(i, delta)| {
            running += *delta;
            ChartPoint {
                timestamp_ms: window.bucket_start(i),
                value: round2(to_decimal(running, decimals)),
            }
        })
        .collect();

    let summary = summarize(&points);
    Chart { range, points, summary }
}

/// Start, end and change of a series. A zero start has no defined percentage,
/// it is reported as 0.00.
pub fn summarize(points: &[ChartPoint]) -> Summary {
    let start = points.first().map_or(Decimal::ZERO, |p| p.value);
    let end = points.last().map_or(Decimal::ZERO, |p| p.value);
    let change = round2(end.saturating_sub(start));

    let percent_change = if start.is_zero() {
        round2(Decimal::ZERO)
    } else {
        round2(
            change
                .checked_div(start.abs())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO),
        )
    };

    Summary {
        start,
        end,
        change,
        percent_change,
    }
}
