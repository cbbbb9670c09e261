//! Core configuration for clipeval-animation-core.

use serde::{Deserialize, Serialize};

/// Engine-wide evaluation policy.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Panic when a clip or clock lookup fails. Release hosts skip the
    /// animator for the frame instead and retry next frame.
    pub assert_preconditions: bool,

    /// Stop an animator whose channel mapping references a raw channel the
    /// clip does not have.
    pub stop_on_invalid_mapping: bool,

    /// Invoke callbacks registered with `DispatchMode::Immediate` during
    /// `Engine::update`; deferred ones are always returned to the caller.
    pub dispatch_immediate_callbacks: bool,

    /// Initial capacity hint for per-frame result buffers.
    pub scratch_channels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assert_preconditions: cfg!(debug_assertions),
            stop_on_invalid_mapping: true,
            dispatch_immediate_callbacks: true,
            scratch_channels: 64,
        }
    }
}

impl Config {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Config used by hosts that must never abort on inconsistent scene state.
    pub fn lenient() -> Self {
        Self {
            assert_preconditions: false,
            ..Self::default()
        }
    }
}
