//! Interpolation helpers for function-curve segments.
//!
//! Linear, constant (hold) and cubic-bezier segments are supported; the
//! segment kind is chosen by the left keyframe.

pub mod functions;

pub use functions::{bezier_segment, lerp_f32};
