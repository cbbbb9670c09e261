//! Clip sampling: evaluate every function curve of a clip at one point in time.
//!
//! Model:
//! - A clip's curves are keyed in clip-local seconds.
//! - The sampler receives a normalized phase in [0,1] and maps it onto
//!   `phase * clip.duration` before evaluating.
//! - Output is one value per raw channel component, in authoring order, and is
//!   always exactly `clip.channel_component_count()` long.
//!
//! Sampling is a pure function of (clip, phase); re-evaluating at the same
//! phase yields identical results.

use crate::data::{AnimationClip, FCurve, Interpolation, Keyframe};
use crate::interp::{bezier_segment, lerp_f32};

/// Raw or formatted per-channel results for one frame.
pub type ClipResults = Vec<f32>;

/// Find the segment [i, i+1] that contains `t`.
/// Returns `None` when `t` lies outside the keyed range or on a single key;
/// the caller then holds the nearest end key.
fn find_segment(keys: &[Keyframe], t: f32) -> Option<usize> {
    let n = keys.len();
    if n < 2 || t <= keys[0].time || t >= keys[n - 1].time {
        return None;
    }
    // First key strictly after t; keys are non-decreasing so this is a valid split.
    let right = keys.partition_point(|k| k.time <= t);
    Some(right - 1)
}

/// Evaluate a single curve at clip-local time `t` (seconds).
pub fn evaluate_fcurve(curve: &FCurve, t: f32) -> f32 {
    let keys = &curve.keyframes;
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(f), Some(l)) => (f, l),
        // No keys: neutral 0.0 (fail-soft).
        _ => return 0.0,
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }
    let i = match find_segment(keys, t) {
        Some(i) => i,
        None => return last.value,
    };
    let left = &keys[i];
    let right = &keys[i + 1];
    let span = right.time - left.time;
    if span <= 0.0 {
        return right.value;
    }
    match left.interpolation {
        Interpolation::Constant => left.value,
        Interpolation::Linear => lerp_f32(left.value, right.value, (t - left.time) / span),
        Interpolation::Bezier => bezier_segment(
            [left.time, left.value],
            left.right_handle,
            right.left_handle,
            [right.time, right.value],
            t,
        ),
    }
}

/// Evaluate all curves of `clip` at clip-local time `local_time` (seconds).
pub fn evaluate_clip_at_local_time(clip: &AnimationClip, local_time: f32) -> ClipResults {
    let mut out = Vec::with_capacity(clip.channel_component_count());
    evaluate_clip_into(clip, local_time, &mut out);
    out
}

/// Evaluate all curves of `clip` at normalized phase `phase` in [0,1].
pub fn evaluate_clip_at_phase(clip: &AnimationClip, phase: f32) -> ClipResults {
    evaluate_clip_at_local_time(clip, phase.clamp(0.0, 1.0) * clip.duration)
}

/// Allocation-free variant: clears `out` and fills it with one value per raw channel.
pub fn evaluate_clip_into(clip: &AnimationClip, local_time: f32, out: &mut ClipResults) {
    out.clear();
    out.extend(clip.fcurves().map(|c| evaluate_fcurve(c, local_time)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Channel, ChannelComponent};

    fn curve(keys: Vec<Keyframe>) -> FCurve {
        FCurve::new(keys)
    }

    #[test]
    fn empty_and_single_key_curves() {
        assert_eq!(evaluate_fcurve(&FCurve::default(), 0.3), 0.0);
        let single = curve(vec![Keyframe::linear(0.5, 7.0)]);
        assert_eq!(evaluate_fcurve(&single, 0.0), 7.0);
        assert_eq!(evaluate_fcurve(&single, 9.0), 7.0);
    }

    #[test]
    fn linear_and_constant_segments() {
        let c = curve(vec![
            Keyframe::linear(0.0, 0.0),
            Keyframe::constant(1.0, 10.0),
            Keyframe::linear(2.0, 20.0),
        ]);
        assert_eq!(evaluate_fcurve(&c, 0.5), 5.0);
        // Constant segment holds the left key
        assert_eq!(evaluate_fcurve(&c, 1.5), 10.0);
        // Exactly on a key
        assert_eq!(evaluate_fcurve(&c, 1.0), 10.0);
        // Clamped outside the keyed range
        assert_eq!(evaluate_fcurve(&c, -1.0), 0.0);
        assert_eq!(evaluate_fcurve(&c, 3.0), 20.0);
    }

    #[test]
    fn bezier_without_handles_matches_linear() {
        let mut k0 = Keyframe::linear(0.0, 0.0);
        k0.interpolation = Interpolation::Bezier;
        let c = curve(vec![k0, Keyframe::linear(1.0, 4.0)]);
        assert!((evaluate_fcurve(&c, 0.25) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn phase_maps_onto_duration_and_width_is_stable() {
        let clip = AnimationClip::new(
            "c",
            vec![
                Channel::scalar(
                    "a",
                    curve(vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(2.0, 2.0)]),
                ),
                Channel::new(
                    "b",
                    vec![
                        ChannelComponent {
                            name: "X".into(),
                            fcurve: FCurve::default(),
                        },
                        ChannelComponent {
                            name: "Y".into(),
                            fcurve: curve(vec![Keyframe::constant(0.0, 3.0)]),
                        },
                    ],
                ),
            ],
        );
        for phase in [0.0, 0.25, 0.5, 1.0, 1.5] {
            assert_eq!(evaluate_clip_at_phase(&clip, phase).len(), 3);
        }
        assert_eq!(evaluate_clip_at_phase(&clip, 0.25), vec![0.5, 0.0, 3.0]);
    }
}
