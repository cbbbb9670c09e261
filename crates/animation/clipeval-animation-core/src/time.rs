//! Time advancement: global simulation time (or a seek request) to a local
//! elapsed-time delta in nanoseconds.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Seconds to nanoseconds, rounded to the nearest ns.
#[inline]
pub fn to_nsecs(seconds: f64) -> i64 {
    (seconds * NANOS_PER_SEC).round() as i64
}

#[inline]
pub fn to_secs(ns: i64) -> f64 {
    ns as f64 / NANOS_PER_SEC
}

/// Where this frame's time comes from.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimeSource {
    /// Jump directly to a normalized position in [0,1].
    Seek { normalized: f32 },
    /// Advance incrementally from the last evaluated global time.
    Advance { global_time_ns: i64 },
}

/// Compute the elapsed local delta (ns) for this frame.
///
/// - `Seek`: the absolute local time `clip_duration * normalized`, unscaled by the clock.
/// - `Advance`: `global_time_ns - last_global_time_ns`, scaled by `clock` if one is bound.
///   A never-evaluated animator (`last_global_time_ns == 0`) yields the full global time.
pub fn compute_delta(
    source: TimeSource,
    last_global_time_ns: i64,
    clock: Option<&Clock>,
    clip_duration_ns: i64,
) -> i64 {
    match source {
        TimeSource::Seek { normalized } => {
            let n = f64::from(normalized.clamp(0.0, 1.0));
            (clip_duration_ns as f64 * n).round() as i64
        }
        TimeSource::Advance { global_time_ns } => {
            let raw = global_time_ns - last_global_time_ns;
            match clock {
                Some(c) => c.scale_delta(raw),
                None => raw,
            }
        }
    }
}
