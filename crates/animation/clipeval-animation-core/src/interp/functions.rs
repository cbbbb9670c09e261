//! Interpolation helpers:
//! - lerp_f32 (linear)
//! - bezier_segment (cubic bezier through absolute handles, solved for time)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

const SOLVE_ITERATIONS: usize = 32;
const SOLVE_EPS: f32 = 1e-6;

/// Find the curve parameter u in [0,1] where the x-cubic equals `x`.
/// Assumes x is monotonic over the segment (handles clamped into the segment span).
#[inline]
fn solve_bezier_param(x: f32, x0: f32, x1: f32, x2: f32, x3: f32) -> f32 {
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let span = x3 - x0;
    let mut mid = if span > 0.0 {
        ((x - x0) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    for _ in 0..SOLVE_ITERATIONS {
        let xm = cubic_bezier(x0, x1, x2, x3, mid);
        if (xm - x).abs() < SOLVE_EPS {
            break;
        }
        if xm < x {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    mid
}

/// Evaluate a bezier segment between `left` and `right` keyframe coordinates at time `t`.
///
/// `out_handle` belongs to the left keyframe and `in_handle` to the right one;
/// both are absolute (time, value). Missing handles default to the one-third
/// points on the straight line, which reproduces a linear segment.
pub fn bezier_segment(
    left: [f32; 2],
    out_handle: Option<[f32; 2]>,
    in_handle: Option<[f32; 2]>,
    right: [f32; 2],
    t: f32,
) -> f32 {
    let span = right[0] - left[0];
    if span <= 0.0 {
        return left[1];
    }
    let rise = right[1] - left[1];
    let p1 = out_handle.unwrap_or([left[0] + span / 3.0, left[1] + rise / 3.0]);
    let p2 = in_handle.unwrap_or([right[0] - span / 3.0, right[1] - rise / 3.0]);
    // Keep the time cubic monotonic.
    let x1 = p1[0].clamp(left[0], right[0]);
    let x2 = p2[0].clamp(left[0], right[0]);
    let u = solve_bezier_param(t, left[0], x1, x2, right[0]);
    cubic_bezier(left[1], p1[1], p2[1], right[1], u)
}
