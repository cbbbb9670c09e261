//! Clip data model: channels of per-component function curves.
//!
//! A clip's raw output layout is the flattened list of channel components in
//! authoring order; `raw index` below always refers to that flattened order.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// How a curve segment is interpolated, stored on the segment's left keyframe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Hold the left keyframe's value until the next keyframe.
    Constant,
    #[default]
    Linear,
    /// Cubic bezier through the keyframe handles.
    Bezier,
}

/// A single keyframe in clip-local seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Incoming bezier handle as absolute (time, value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_handle: Option<[f32; 2]>,
    /// Outgoing bezier handle as absolute (time, value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_handle: Option<[f32; 2]>,
}

impl Keyframe {
    pub fn linear(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::Linear,
            left_handle: None,
            right_handle: None,
        }
    }

    pub fn constant(time: f32, value: f32) -> Self {
        Self {
            interpolation: Interpolation::Constant,
            ..Self::linear(time, value)
        }
    }

    pub fn bezier(time: f32, value: f32, left: [f32; 2], right: [f32; 2]) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::Bezier,
            left_handle: Some(left),
            right_handle: Some(right),
        }
    }
}

/// Function curve: ordered keyframes for one scalar component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub keyframes: Vec<Keyframe>,
}

impl FCurve {
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    pub fn start_time(&self) -> Option<f32> {
        self.keyframes.first().map(|k| k.time)
    }

    pub fn end_time(&self) -> Option<f32> {
        self.keyframes.last().map(|k| k.time)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelComponent {
    /// Component suffix, e.g. "X" or "W". May be empty for scalar channels.
    #[serde(default)]
    pub name: String,
    pub fcurve: FCurve,
}

/// A named channel (e.g. "Location") with one curve per component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub components: Vec<ChannelComponent>,
}

impl Channel {
    pub fn new(name: impl Into<String>, components: Vec<ChannelComponent>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Single-component channel.
    pub fn scalar(name: impl Into<String>, fcurve: FCurve) -> Self {
        Self::new(
            name,
            vec![ChannelComponent {
                name: String::new(),
                fcurve,
            }],
        )
    }
}

/// Animation clip, read-only while animators evaluate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Clip length in seconds.
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Build a clip whose duration is the latest keyframe time of any curve.
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .flat_map(|c| c.components.iter())
            .filter_map(|c| c.fcurve.end_time())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Number of raw channel components (the width of sampler output).
    pub fn channel_component_count(&self) -> usize {
        self.channels.iter().map(|c| c.components.len()).sum()
    }

    /// Iterate curves in raw index order.
    pub fn fcurves(&self) -> impl Iterator<Item = &FCurve> {
        self.channels
            .iter()
            .flat_map(|c| c.components.iter().map(|cc| &cc.fcurve))
    }

    /// Raw index of the first component of `channel_name`, with its component count.
    pub fn channel_range(&self, channel_name: &str) -> Option<(usize, usize)> {
        let mut base = 0usize;
        for channel in &self.channels {
            if channel.name == channel_name {
                return Some((base, channel.components.len()));
            }
            base += channel.components.len();
        }
        None
    }

    /// Raw index of a component looked up by channel name and component suffix.
    pub fn raw_index_of(&self, channel_name: &str, component: &str) -> Option<usize> {
        let (base, _) = self.channel_range(channel_name)?;
        let channel = self.channels.iter().find(|c| c.name == channel_name)?;
        channel
            .components
            .iter()
            .position(|c| c.name == component)
            .map(|i| base + i)
    }

    /// Validate invariants the evaluator relies on.
    pub fn validate(&self) -> EvalResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(EvalError::invalid_clip(format!(
                "clip '{}' duration must be finite and > 0 (got {})",
                self.name, self.duration
            )));
        }
        for channel in &self.channels {
            for component in &channel.components {
                let mut last = f32::NEG_INFINITY;
                for key in &component.fcurve.keyframes {
                    if !key.time.is_finite() || !key.value.is_finite() {
                        return Err(EvalError::invalid_clip(format!(
                            "non-finite keyframe in '{}{}'",
                            channel.name, component.name
                        )));
                    }
                    if key.time < last {
                        return Err(EvalError::invalid_clip(format!(
                            "keyframe times must be non-decreasing in '{}{}'",
                            channel.name, component.name
                        )));
                    }
                    let handles_finite = key
                        .left_handle
                        .iter()
                        .chain(key.right_handle.iter())
                        .all(|h| h[0].is_finite() && h[1].is_finite());
                    if !handles_finite {
                        return Err(EvalError::invalid_clip(format!(
                            "non-finite bezier handle in '{}{}'",
                            channel.name, component.name
                        )));
                    }
                    last = key.time;
                }
            }
        }
        Ok(())
    }
}
