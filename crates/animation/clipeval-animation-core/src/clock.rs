//! Animation clocks: per-animator time dilation.

use serde::{Deserialize, Serialize};

/// Scales elapsed global time into clip-local time. A negative rate plays backward.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub playback_rate: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::identity()
    }
}

impl Clock {
    pub fn identity() -> Self {
        Self { playback_rate: 1.0 }
    }

    pub fn with_rate(playback_rate: f64) -> Self {
        Self { playback_rate }
    }

    /// Scale a global elapsed delta (ns) into a local delta (ns), rounded to the nearest ns.
    #[inline]
    pub fn scale_delta(&self, delta_ns: i64) -> i64 {
        (delta_ns as f64 * self.playback_rate).round() as i64
    }
}
