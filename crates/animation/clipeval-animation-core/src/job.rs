//! Per-animator evaluation job.
//!
//! One call evaluates one clip animator for one frame:
//! time advance -> phase -> sampling -> formatting -> record -> callbacks,
//! and only then commits the animator's time state. A failed frame leaves
//! the playhead where it was.

use crate::animator::ClipAnimator;
use crate::binding::{ClipLookup, ClockLookup};
use crate::callbacks::{prepare_callbacks, CallbackInvocation, CallbackRegistry};
use crate::config::Config;
use crate::error::{EvalError, EvalResult};
use crate::format::format_clip_results;
use crate::ids::AnimatorId;
use crate::interner::PropertyInterner;
use crate::outputs::{prepare_animation_record, AnimationRecord};
use crate::phase::{evaluate_phase, PhaseInput, PhaseMode};
use crate::sampling::{evaluate_clip_into, ClipResults};
use crate::time::{compute_delta, to_nsecs, to_secs, TimeSource};

/// Read-only collaborators shared by every evaluation of a frame.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub clips: &'a dyn ClipLookup,
    pub clocks: &'a dyn ClockLookup,
    pub callbacks: &'a CallbackRegistry,
    pub interner: &'a PropertyInterner,
    pub cfg: &'a Config,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    pub raw_clip_results: ClipResults,
    pub formatted_clip_results: ClipResults,
    pub is_final_frame: bool,
    pub local_time_ns: i64,
    pub normalized_local_time: f32,
    pub current_loop: u32,
}

/// Everything produced by one evaluated frame, handed to the frontend.
#[derive(Debug)]
pub struct PostFrameData {
    pub record: AnimationRecord,
    pub callbacks: Vec<CallbackInvocation>,
    pub evaluation: EvaluationResult,
}

#[derive(Debug)]
pub enum FrameOutcome {
    /// Neither running nor seeking; nothing was touched.
    Idle,
    Evaluated(PostFrameData),
}

impl FrameOutcome {
    pub fn evaluated(&self) -> Option<&PostFrameData> {
        match self {
            FrameOutcome::Evaluated(data) => Some(data),
            FrameOutcome::Idle => None,
        }
    }

    pub fn into_evaluated(self) -> Option<PostFrameData> {
        match self {
            FrameOutcome::Evaluated(data) => Some(data),
            FrameOutcome::Idle => None,
        }
    }
}

fn precondition_failed(animator: AnimatorId, cfg: &Config, err: EvalError) -> EvalError {
    if cfg.assert_preconditions {
        panic!("animator {animator:?}: {err}");
    }
    log::error!("animator {animator:?} skipped: {err}");
    err
}

fn content_error(animator: &mut ClipAnimator, cfg: &Config, err: EvalError) -> EvalError {
    if cfg.stop_on_invalid_mapping {
        log::warn!("animator {:?} stopped: {err}", animator.id);
        animator.halt();
    } else {
        log::warn!("animator {:?} frame dropped: {err}", animator.id);
    }
    err
}

/// Evaluate one animator at `global_time_ns`.
///
/// Lookup failures return before anything is mutated, so the next frame
/// retries. Content errors (bad mapping, zero-length clip) leave the time
/// state untouched and stop the animator when `cfg.stop_on_invalid_mapping`.
pub fn evaluate_clip_animator(
    animator: &mut ClipAnimator,
    global_time_ns: i64,
    ctx: &JobContext<'_>,
) -> EvalResult<FrameOutcome> {
    let Some(source) = animator.time_source(global_time_ns) else {
        return Ok(FrameOutcome::Idle);
    };

    let clip = ctx
        .clips
        .lookup_clip(animator.clip_id)
        .ok_or_else(|| {
            precondition_failed(animator.id, ctx.cfg, EvalError::ClipNotFound(animator.clip_id))
        })?;
    let clock = match animator.clock_id {
        Some(id) => Some(ctx.clocks.lookup_clock(id).ok_or_else(|| {
            precondition_failed(animator.id, ctx.cfg, EvalError::ClockNotFound(id))
        })?),
        None => None,
    };

    let duration_ns = to_nsecs(f64::from(clip.duration));
    if duration_ns <= 0 {
        let err = EvalError::invalid_clip(format!("clip '{}' has no duration", clip.name));
        return Err(content_error(animator, ctx.cfg, err));
    }

    if animator.needs_layout() {
        animator.rebuild_layout(clip, ctx.interner);
    }

    let delta_ns = compute_delta(source, animator.last_global_time_ns(), clock, duration_ns);
    let mode = match source {
        TimeSource::Seek { normalized } => PhaseMode::Seek { normalized },
        TimeSource::Advance { .. } => PhaseMode::Advance,
    };
    let phase = evaluate_phase(&PhaseInput {
        duration_ns,
        delta_ns,
        previous_local_time_ns: animator.last_local_time_ns(),
        policy: animator.loops,
        mode,
    });

    let mut raw = Vec::with_capacity(ctx.cfg.scratch_channels.max(clip.channel_component_count()));
    evaluate_clip_into(
        clip,
        phase.normalized_local_time * clip.duration,
        &mut raw,
    );

    let formatted = match format_clip_results(&raw, animator.clip_format()) {
        Ok(f) => f,
        Err(err) => return Err(content_error(animator, ctx.cfg, err)),
    };
    let record = match prepare_animation_record(
        animator.id,
        animator.mapping_data(),
        &formatted,
        phase.is_final_frame,
        phase.normalized_local_time,
    ) {
        Ok(r) => r,
        Err(err) => return Err(content_error(animator, ctx.cfg, err)),
    };
    let callbacks = match prepare_callbacks(
        animator.id,
        animator.mapping_data(),
        &formatted,
        phase.is_final_frame,
        phase.normalized_local_time,
        ctx.callbacks,
    ) {
        Ok(c) => c,
        Err(err) => return Err(content_error(animator, ctx.cfg, err)),
    };

    log::trace!(
        "animator {:?}: local {:.4}s phase {:.4} loop {}",
        animator.id,
        to_secs(phase.local_time_ns),
        phase.normalized_local_time,
        phase.current_loop
    );
    if phase.is_final_frame {
        log::debug!("animator {:?} reached its final frame", animator.id);
    }

    animator.commit_frame(global_time_ns, &phase);

    Ok(FrameOutcome::Evaluated(PostFrameData {
        record,
        callbacks,
        evaluation: EvaluationResult {
            raw_clip_results: raw,
            formatted_clip_results: formatted,
            is_final_frame: phase.is_final_frame,
            local_time_ns: phase.local_time_ns,
            normalized_local_time: phase.normalized_local_time,
            current_loop: phase.current_loop,
        },
    }))
}
