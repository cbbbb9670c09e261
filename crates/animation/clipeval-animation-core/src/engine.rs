//! Engine: data ownership and the public per-frame API.
//!
//! Methods:
//! - new, load_clip, add_clock, create_animator, set_mapper, callback registration
//! - tick (update at the simulation clock's current time)
//! - update (apply commands -> evaluate every animator -> push records -> dispatch callbacks)

use std::sync::Arc;

use crate::animator::{AnimatorCfg, ClipAnimator};
use crate::binding::{ClipLibrary, ClipLookup, ClockRegistry, PropertySink, SimulationClock};
use crate::callbacks::{CallbackEvent, CallbackInvocation, CallbackRegistry, DispatchMode};
use crate::clock::Clock;
use crate::config::Config;
use crate::data::AnimationClip;
use crate::error::{EvalError, EvalResult};
use crate::ids::{AnimatorId, CallbackId, ClipId, ClockId, IdAllocator};
use crate::inputs::{AnimatorCommand, Inputs};
use crate::interner::PropertyInterner;
use crate::job::{evaluate_clip_animator, FrameOutcome, JobContext};
use crate::mapping::ChannelMapper;

/// Summary of one `Engine::update`.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Animators that produced a record this frame.
    pub evaluated: Vec<AnimatorId>,
    /// Animators whose final frame was this frame.
    pub finished: Vec<AnimatorId>,
    /// Per-animator failures. A failing animator never aborts the others.
    pub errors: Vec<(AnimatorId, EvalError)>,
    /// Callbacks the host must post to their owning thread.
    pub deferred_callbacks: Vec<CallbackInvocation>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    clips: ClipLibrary,
    clocks: ClockRegistry,
    animators: Vec<ClipAnimator>,
    callbacks: CallbackRegistry,
    interner: Arc<PropertyInterner>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self::with_interner(cfg, Arc::new(PropertyInterner::new()))
    }

    /// Share a property interner with other engines or host systems.
    pub fn with_interner(cfg: Config, interner: Arc<PropertyInterner>) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            clips: ClipLibrary::new(),
            clocks: ClockRegistry::new(),
            animators: Vec::new(),
            callbacks: CallbackRegistry::new(),
            interner,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn interner(&self) -> &Arc<PropertyInterner> {
        &self.interner
    }

    /// Validate and store a clip.
    pub fn load_clip(&mut self, clip: AnimationClip) -> EvalResult<ClipId> {
        clip.validate()?;
        let id = self.ids.alloc_clip();
        log::debug!(
            "loaded clip '{}' as {id:?} ({} channels, {:.3}s)",
            clip.name,
            clip.channel_component_count(),
            clip.duration
        );
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Replace a loaded clip's content. Animators bound to it rebuild their layout.
    pub fn replace_clip(&mut self, id: ClipId, clip: AnimationClip) -> EvalResult<()> {
        if self.clips.lookup_clip(id).is_none() {
            return Err(EvalError::ClipNotFound(id));
        }
        clip.validate()?;
        self.clips.insert(id, clip);
        for a in self.animators.iter_mut().filter(|a| a.clip_id == id) {
            a.invalidate_layout();
        }
        Ok(())
    }

    /// Remove a clip. Animators still bound to it report `ClipNotFound` while running.
    pub fn unload_clip(&mut self, id: ClipId) -> Option<AnimationClip> {
        self.clips.remove(id)
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.lookup_clip(id)
    }

    pub fn add_clock(&mut self, clock: Clock) -> ClockId {
        let id = self.ids.alloc_clock();
        self.clocks.insert(id, clock);
        id
    }

    pub fn clock_mut(&mut self, id: ClockId) -> Option<&mut Clock> {
        self.clocks.get_mut(id)
    }

    pub fn remove_clock(&mut self, id: ClockId) -> Option<Clock> {
        self.clocks.remove(id)
    }

    pub fn create_animator(&mut self, cfg: AnimatorCfg) -> AnimatorId {
        let id = self.ids.alloc_animator();
        self.animators.push(ClipAnimator::new(id, cfg));
        id
    }

    pub fn remove_animator(&mut self, id: AnimatorId) -> EvalResult<ClipAnimator> {
        let idx = self
            .animators
            .iter()
            .position(|a| a.id == id)
            .ok_or(EvalError::AnimatorNotFound(id))?;
        self.callbacks.clear_final_frame(id);
        Ok(self.animators.remove(idx))
    }

    pub fn animator(&self, id: AnimatorId) -> Option<&ClipAnimator> {
        self.animators.iter().find(|a| a.id == id)
    }

    pub fn animator_mut(&mut self, id: AnimatorId) -> EvalResult<&mut ClipAnimator> {
        self.animators
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(EvalError::AnimatorNotFound(id))
    }

    pub fn animators(&self) -> impl Iterator<Item = &ClipAnimator> {
        self.animators.iter()
    }

    pub fn start_animator(&mut self, id: AnimatorId) -> EvalResult<()> {
        self.animator_mut(id)?.start();
        log::debug!("animator {id:?} started");
        Ok(())
    }

    /// Start without counting the time since the animator last ran.
    pub fn start_animator_at(&mut self, id: AnimatorId, global_time_ns: i64) -> EvalResult<()> {
        self.animator_mut(id)?.start_at(global_time_ns);
        log::debug!("animator {id:?} started at {global_time_ns}ns");
        Ok(())
    }

    pub fn stop_animator(&mut self, id: AnimatorId) -> EvalResult<()> {
        self.animator_mut(id)?.stop();
        log::debug!("animator {id:?} stopped");
        Ok(())
    }

    pub fn seek_animator(&mut self, id: AnimatorId, normalized: f32) -> EvalResult<()> {
        self.animator_mut(id)?.seek(normalized);
        log::debug!("animator {id:?} seeking to {normalized}");
        Ok(())
    }

    pub fn set_mapper(&mut self, id: AnimatorId, mapper: ChannelMapper) -> EvalResult<()> {
        self.animator_mut(id)?.set_mapper(mapper);
        Ok(())
    }

    pub fn register_value_callback<F>(&mut self, mode: DispatchMode, func: F) -> CallbackId
    where
        F: Fn(&CallbackEvent) + Send + Sync + 'static,
    {
        self.callbacks.register_value(mode, func)
    }

    pub fn unregister_value_callback(&mut self, id: CallbackId) -> bool {
        self.callbacks.unregister_value(id)
    }

    pub fn register_final_frame_callback<F>(
        &mut self,
        animator: AnimatorId,
        mode: DispatchMode,
        func: F,
    ) -> EvalResult<()>
    where
        F: Fn(&CallbackEvent) + Send + Sync + 'static,
    {
        if self.animator(animator).is_none() {
            return Err(EvalError::AnimatorNotFound(animator));
        }
        self.callbacks.register_final_frame(animator, mode, func);
        Ok(())
    }

    fn apply_command(&mut self, cmd: AnimatorCommand, global_time_ns: i64) -> EvalResult<()> {
        let animator = self.animator_mut(cmd.animator())?;
        match cmd {
            AnimatorCommand::Start { .. } => animator.start(),
            AnimatorCommand::StartAt { .. } => animator.start_at(global_time_ns),
            AnimatorCommand::Stop { .. } => animator.stop(),
            AnimatorCommand::Seek { normalized, .. } => animator.seek(normalized),
            AnimatorCommand::Rewind { .. } => animator.rewind(),
            AnimatorCommand::SetLoops { loops, .. } => animator.loops = loops,
            AnimatorCommand::SetClock { clock, .. } => animator.clock_id = clock,
        }
        log::debug!("applied {cmd:?}");
        Ok(())
    }

    /// Evaluate every animator at `global_time_ns`.
    ///
    /// Commands in `inputs` are applied first. Records go to `sink` in animator
    /// creation order; immediate callbacks run after all records were pushed
    /// when `dispatch_immediate_callbacks` is set, otherwise they are returned
    /// with the deferred ones.
    pub fn update(
        &mut self,
        global_time_ns: i64,
        inputs: Inputs,
        sink: &mut dyn PropertySink,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        for cmd in inputs.animator_cmds {
            let id = cmd.animator();
            if let Err(err) = self.apply_command(cmd, global_time_ns) {
                log::warn!("command for {id:?} ignored: {err}");
                report.errors.push((id, err));
            }
        }

        let ctx = JobContext {
            clips: &self.clips,
            clocks: &self.clocks,
            callbacks: &self.callbacks,
            interner: &self.interner,
            cfg: &self.cfg,
        };
        let mut immediate = Vec::new();

        for animator in self.animators.iter_mut() {
            let id = animator.id;
            match evaluate_clip_animator(animator, global_time_ns, &ctx) {
                Ok(FrameOutcome::Idle) => {}
                Ok(FrameOutcome::Evaluated(post)) => {
                    sink.apply(&post.record);
                    report.evaluated.push(id);
                    if post.evaluation.is_final_frame {
                        report.finished.push(id);
                    }
                    for cb in post.callbacks {
                        match cb.mode {
                            DispatchMode::Immediate if self.cfg.dispatch_immediate_callbacks => {
                                immediate.push(cb)
                            }
                            _ => report.deferred_callbacks.push(cb),
                        }
                    }
                }
                Err(err) => report.errors.push((id, err)),
            }
        }

        for cb in &immediate {
            cb.invoke();
        }
        report
    }

    /// Evaluate every animator at the simulation clock's current time.
    pub fn tick(
        &mut self,
        clock: &dyn SimulationClock,
        inputs: Inputs,
        sink: &mut dyn PropertySink,
    ) -> FrameReport {
        self.update(clock.global_time_ns(), inputs, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RecordingSink;
    use crate::data::{Channel, FCurve, Keyframe};
    use crate::ids::NodeId;
    use crate::mapping::ChannelMapping;
    use crate::phase::LoopPolicy;
    use clipeval_api_core::{TypedPath, Value, ValueKind};

    const SEC: i64 = 1_000_000_000;

    fn ramp() -> AnimationClip {
        AnimationClip::new(
            "ramp",
            vec![Channel::scalar(
                "Opacity",
                FCurve::new(vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(1.0, 1.0)]),
            )],
        )
    }

    fn opacity_mapper() -> ChannelMapper {
        ChannelMapper::from_mappings([ChannelMapping::new(
            "Opacity",
            NodeId(1),
            TypedPath::parse("Panel/Material.alpha").unwrap(),
            ValueKind::Float,
        )])
    }

    #[test]
    fn load_clip_rejects_invalid_content() {
        let mut engine = Engine::new(Config::lenient());
        let err = engine
            .load_clip(AnimationClip::new("empty", vec![]))
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidClip(_)));
    }

    #[test]
    fn update_pushes_records_through_the_sink() {
        let mut engine = Engine::new(Config::lenient());
        let clip = engine.load_clip(ramp()).unwrap();
        let a = engine.create_animator(AnimatorCfg {
            mapper: opacity_mapper(),
            ..AnimatorCfg::new(clip)
        });
        let mut sink = RecordingSink::new();

        let idle = engine.update(SEC / 4, Inputs::default(), &mut sink);
        assert!(idle.evaluated.is_empty());
        assert!(sink.records.is_empty());

        let report = engine.update(
            SEC / 4,
            Inputs::with_commands([AnimatorCommand::Start { animator: a }]),
            &mut sink,
        );
        assert_eq!(report.evaluated, vec![a]);
        let rec = sink.last().unwrap();
        let update = rec.update_for(NodeId(1), "Panel/Material.alpha").unwrap();
        assert_eq!(update.value, Value::Float(0.25));
    }

    #[test]
    fn commands_for_unknown_animators_are_reported() {
        let mut engine = Engine::new(Config::lenient());
        let mut sink = RecordingSink::new();
        let report = engine.update(
            0,
            Inputs::with_commands([AnimatorCommand::Stop {
                animator: AnimatorId(42),
            }]),
            &mut sink,
        );
        assert_eq!(
            report.errors,
            vec![(AnimatorId(42), EvalError::AnimatorNotFound(AnimatorId(42)))]
        );
    }

    #[test]
    fn set_loops_command_changes_policy() {
        let mut engine = Engine::new(Config::lenient());
        let clip = engine.load_clip(ramp()).unwrap();
        let a = engine.create_animator(AnimatorCfg::new(clip));
        let mut sink = RecordingSink::new();
        engine.update(
            0,
            Inputs::with_commands([AnimatorCommand::SetLoops {
                animator: a,
                loops: LoopPolicy::Forever,
            }]),
            &mut sink,
        );
        assert_eq!(engine.animator(a).unwrap().loops, LoopPolicy::Forever);
    }

    #[test]
    fn remove_animator_drops_it_from_updates() {
        let mut engine = Engine::new(Config::lenient());
        let clip = engine.load_clip(ramp()).unwrap();
        let a = engine.create_animator(AnimatorCfg {
            running: true,
            ..AnimatorCfg::new(clip)
        });
        assert!(engine.remove_animator(a).is_ok());
        assert_eq!(
            engine.remove_animator(a).unwrap_err(),
            EvalError::AnimatorNotFound(a)
        );
        let mut sink = RecordingSink::new();
        let report = engine.update(SEC, Inputs::default(), &mut sink);
        assert!(report.evaluated.is_empty());
    }
}
