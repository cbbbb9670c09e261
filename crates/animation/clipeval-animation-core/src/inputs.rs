//! Per-frame input contracts for the engine.
//!
//! Frontend property changes (running, seek, loops, clock) arrive as animator
//! commands and are applied in order before any animator is evaluated.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimatorId, ClockId};
use crate::phase::LoopPolicy;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub animator_cmds: Vec<AnimatorCommand>,
}

impl Inputs {
    pub fn with_commands(cmds: impl IntoIterator<Item = AnimatorCommand>) -> Self {
        Self {
            animator_cmds: cmds.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimatorCommand {
    Start {
        animator: AnimatorId,
    },
    /// Start and re-anchor delta computation at the current frame's global time.
    StartAt {
        animator: AnimatorId,
    },
    Stop {
        animator: AnimatorId,
    },
    Seek {
        animator: AnimatorId,
        normalized: f32,
    },
    Rewind {
        animator: AnimatorId,
    },
    SetLoops {
        animator: AnimatorId,
        loops: LoopPolicy,
    },
    SetClock {
        animator: AnimatorId,
        clock: Option<ClockId>,
    },
}

impl AnimatorCommand {
    pub fn animator(&self) -> AnimatorId {
        match *self {
            AnimatorCommand::Start { animator }
            | AnimatorCommand::StartAt { animator }
            | AnimatorCommand::Stop { animator }
            | AnimatorCommand::Seek { animator, .. }
            | AnimatorCommand::Rewind { animator }
            | AnimatorCommand::SetLoops { animator, .. }
            | AnimatorCommand::SetClock { animator, .. } => animator,
        }
    }
}
