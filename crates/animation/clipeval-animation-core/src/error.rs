//! Error taxonomy for clip evaluation.

use thiserror::Error;

use crate::ids::{AnimatorId, ClipId, ClockId};

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("clip {0:?} not found")]
    ClipNotFound(ClipId),

    #[error("clock {0:?} not found")]
    ClockNotFound(ClockId),

    #[error("animator {0:?} not found")]
    AnimatorNotFound(AnimatorId),

    #[error(
        "invalid channel mapping: slot {slot} reads raw channel {source_index} but the clip has {channel_count}"
    )]
    InvalidChannelMapping {
        slot: usize,
        source_index: usize,
        channel_count: usize,
    },

    #[error("invalid clip: {0}")]
    InvalidClip(String),
}

impl EvalError {
    /// Lookup failures caused by inconsistent scene state rather than authored content.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EvalError::ClipNotFound(_) | EvalError::ClockNotFound(_) | EvalError::AnimatorNotFound(_)
        )
    }

    pub fn invalid_clip(msg: impl Into<String>) -> Self {
        Self::InvalidClip(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_classification() {
        assert!(EvalError::ClipNotFound(ClipId(1)).is_precondition());
        assert!(EvalError::ClockNotFound(ClockId(1)).is_precondition());
        assert!(!EvalError::invalid_clip("x").is_precondition());
        assert!(!EvalError::InvalidChannelMapping {
            slot: 0,
            source_index: 5,
            channel_count: 3
        }
        .is_precondition());
    }

    #[test]
    fn mapping_error_message_names_the_slot() {
        let e = EvalError::InvalidChannelMapping {
            slot: 2,
            source_index: 5,
            channel_count: 3,
        };
        assert!(e.to_string().contains("slot 2"));
        assert!(e.to_string().contains("raw channel 5"));
    }
}
