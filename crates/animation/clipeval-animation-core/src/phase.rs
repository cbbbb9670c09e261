//! Phase evaluation: elapsed local time to a normalized clip phase under a loop policy.
//!
//! `local_time_ns` is the absolute playhead across loops: loop `k` covers
//! `[k * duration, (k + 1) * duration)`. The normalized phase is the position
//! inside the current loop and always lies in [0,1].

use serde::{Deserialize, Serialize};

/// How many times a clip plays before the animator finishes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopPolicy {
    #[default]
    Once,
    /// Play N times. `Times(0)` and `Times(1)` behave like `Once`.
    Times(u32),
    Forever,
}

impl LoopPolicy {
    /// Number of loops after which playback terminates, or `None` for `Forever`.
    #[inline]
    pub fn loop_limit(self) -> Option<u32> {
        match self {
            LoopPolicy::Once => Some(1),
            LoopPolicy::Times(n) => Some(n.max(1)),
            LoopPolicy::Forever => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PhaseMode {
    /// `delta_ns` is added to the previous playhead.
    Advance,
    /// `delta_ns` is already the absolute local time of the seek target.
    Seek { normalized: f32 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhaseInput {
    pub duration_ns: i64,
    pub delta_ns: i64,
    pub previous_local_time_ns: i64,
    pub policy: LoopPolicy,
    pub mode: PhaseMode,
}

/// Result of phase evaluation for one frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipPhase {
    pub local_time_ns: i64,
    pub normalized_local_time: f32,
    /// Completed loop iterations. Saturates at the policy's loop limit.
    pub current_loop: u32,
    pub is_final_frame: bool,
}

impl ClipPhase {
    fn terminated(local_time_ns: i64, current_loop: u32) -> Self {
        Self {
            local_time_ns,
            normalized_local_time: 1.0,
            current_loop,
            is_final_frame: true,
        }
    }
}

#[inline]
fn loops_completed(local_ns: i64, duration_ns: i64) -> u32 {
    u32::try_from(local_ns / duration_ns).unwrap_or(u32::MAX)
}

#[inline]
fn fraction(local_ns: i64, duration_ns: i64) -> f32 {
    let within = local_ns.rem_euclid(duration_ns);
    ((within as f64) / (duration_ns as f64)).clamp(0.0, 1.0) as f32
}

/// Evaluate the clip phase for one frame.
///
/// Final frame is reported only on the frame that crosses the terminal
/// boundary: the end of the last loop when playing forward, or the start of
/// the first loop when playing backward. `Forever` never terminates.
pub fn evaluate_phase(input: &PhaseInput) -> ClipPhase {
    let d = input.duration_ns;
    debug_assert!(d > 0, "clip duration must be positive (got {d} ns)");
    if d <= 0 {
        return ClipPhase::terminated(0, 0);
    }

    match input.mode {
        PhaseMode::Seek { normalized } => seek_phase(input, normalized),
        PhaseMode::Advance => advance_phase(input),
    }
}

fn seek_phase(input: &PhaseInput, normalized: f32) -> ClipPhase {
    let d = input.duration_ns;
    let normalized = normalized.clamp(0.0, 1.0);
    let local = input.delta_ns.clamp(0, d);
    // Seeking positions within the first loop; only a single-loop policy ends there.
    let is_final_frame = input.policy.loop_limit() == Some(1) && local >= d;
    ClipPhase {
        local_time_ns: local,
        normalized_local_time: normalized,
        current_loop: if is_final_frame { 1 } else { 0 },
        is_final_frame,
    }
}

fn advance_phase(input: &PhaseInput) -> ClipPhase {
    let d = input.duration_ns;
    let previous = input.previous_local_time_ns;
    let local = previous.saturating_add(input.delta_ns);
    let reverse = input.delta_ns < 0;

    let limit = match input.policy.loop_limit() {
        Some(limit) => limit,
        None => {
            // Backward past the start wraps into the first loop.
            let local = if local < 0 { local.rem_euclid(d) } else { local };
            return ClipPhase {
                local_time_ns: local,
                normalized_local_time: fraction(local, d),
                current_loop: loops_completed(local, d),
                is_final_frame: false,
            };
        }
    };

    let end = d.saturating_mul(i64::from(limit));
    let local = local.clamp(0, end);

    if !reverse && local >= end {
        // Only the crossing frame is final; later frames stay parked at the end.
        return ClipPhase {
            is_final_frame: previous < end,
            ..ClipPhase::terminated(end, limit)
        };
    }

    ClipPhase {
        local_time_ns: local,
        normalized_local_time: fraction(local, d),
        current_loop: loops_completed(local, d).min(limit),
        is_final_frame: reverse && local == 0 && previous > 0,
    }
}
