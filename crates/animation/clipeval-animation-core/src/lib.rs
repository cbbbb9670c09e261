//! Clipeval Animation Core (engine-agnostic)
//!
//! Per-frame clip animation evaluation. For every running or seeking clip
//! animator a frame advances local time from global simulation time (or jumps
//! to a seek target), resolves the loop phase, samples the clip's curves,
//! reformats the raw channels into the animator's mapping layout, and builds a
//! property-update record plus a callback list for the frontend.
//!
//! `evaluate_clip_animator` is the single-animator job; `Engine` owns clips,
//! clocks and animators and runs the job for all of them.

pub mod animator;
pub mod binding;
pub mod callbacks;
pub mod clock;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod inputs;
pub mod interner;
pub mod interp;
pub mod job;
pub mod mapping;
pub mod outputs;
pub mod phase;
pub mod sampling;
pub mod time;

// Re-exports for consumers (hosts and adapters)
pub use animator::{AnimatorCfg, ClipAnimator};
pub use binding::{
    ClipLibrary, ClipLookup, ClockLookup, ClockRegistry, ManualClock, PropertySink,
    RecordingSink, SimulationClock,
};
pub use callbacks::{
    prepare_callbacks, CallbackEvent, CallbackFn, CallbackInvocation, CallbackRegistry,
    DispatchMode,
};
pub use clock::Clock;
pub use config::Config;
pub use data::{AnimationClip, Channel, ChannelComponent, FCurve, Interpolation, Keyframe};
pub use engine::{Engine, FrameReport};
pub use error::{EvalError, EvalResult};
pub use format::{format_clip_results, ClipFormat};
pub use ids::{AnimatorId, CallbackId, ClipId, ClockId, NodeId, PropertyId};
pub use inputs::{AnimatorCommand, Inputs};
pub use interner::PropertyInterner;
pub use job::{evaluate_clip_animator, EvaluationResult, FrameOutcome, JobContext, PostFrameData};
pub use mapping::{ChannelMapper, ChannelMapping, MappingData};
pub use outputs::{prepare_animation_record, AnimationRecord, PropertyUpdate};
pub use phase::{evaluate_phase, ClipPhase, LoopPolicy, PhaseInput, PhaseMode};
pub use sampling::{evaluate_clip_at_local_time, evaluate_clip_at_phase, ClipResults};
pub use time::{compute_delta, to_nsecs, to_secs, TimeSource};
pub use clipeval_api_core::{TypedPath, Value, ValueKind};
