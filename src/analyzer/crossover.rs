use chrono::{DateTime, Utc};

use crate::model::{Crossover, CrossoverKind};

fn sign(diff: f64) -> i8 {
    if diff > 0.0 {
        1
    } else if diff < 0.0 {
        -1
    } else {
        0
    }
}

/// Scans two aligned moving-average columns for crossing points.
///
/// A single-pass fold carries the previous sign of `ma_short - ma_long`
/// and classifies a jump of +2 (below to above) as bullish and -2 as
/// bearish. The first index never produces an event. A tie (difference
/// exactly zero) breaks the jump in two +1 steps, so a crossing that
/// lingers on equality for a point is not reported.
pub fn detect(
    timestamps: &[DateTime<Utc>],
    ma_short: &[f64],
    ma_long: &[f64],
) -> Vec<Crossover> {
    debug_assert_eq!(timestamps.len(), ma_short.len());
    debug_assert_eq!(ma_short.len(), ma_long.len());

    let mut events = Vec::new();
    let mut prev: Option<i8> = None;

    for i in 0..ma_short.len() {
        let s = sign(ma_short[i] - ma_long[i]);
        if let Some(p) = prev {
            match i16::from(s) - i16::from(p) {
                2 => events.push(Crossover {
                    timestamp: timestamps[i],
                    kind: CrossoverKind::Bullish,
                }),
                -2 => events.push(Crossover {
                    timestamp: timestamps[i],
                    kind: CrossoverKind::Bearish,
                }),
                _ => {}
            }
        }
        prev = Some(s);
    }

    events
}

/// Splits events into chronological bullish and bearish timestamp lists.
pub fn split_by_kind(events: &[Crossover]) -> (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>) {
    let bullish = events
        .iter()
        .filter(|e| e.kind == CrossoverKind::Bullish)
        .map(|e| e.timestamp)
        .collect();
    let bearish = events
        .iter()
        .filter(|e| e.kind == CrossoverKind::Bearish)
        .map(|e| e.timestamp)
        .collect();
    (bullish, bearish)
}
