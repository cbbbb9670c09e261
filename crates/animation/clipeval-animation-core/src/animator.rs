//! Clip animator: per-node playback state for one clip.
//!
//! The animator is owned by the host (or `Engine`) and mutated once per
//! evaluated frame by `evaluate_clip_animator`. Evaluations of one animator
//! must be serialized by the caller.

use serde::{Deserialize, Serialize};

use crate::data::AnimationClip;
use crate::format::ClipFormat;
use crate::ids::{AnimatorId, ClipId, ClockId};
use crate::interner::PropertyInterner;
use crate::mapping::{ChannelMapper, MappingData};
use crate::phase::{ClipPhase, LoopPolicy};
use crate::time::TimeSource;

/// Configuration for creating an animator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimatorCfg {
    pub clip: ClipId,
    #[serde(default)]
    pub clock: Option<ClockId>,
    #[serde(default)]
    pub loops: LoopPolicy,
    #[serde(default)]
    pub mapper: ChannelMapper,
    /// Start running immediately.
    #[serde(default)]
    pub running: bool,
}

impl AnimatorCfg {
    pub fn new(clip: ClipId) -> Self {
        Self {
            clip,
            clock: None,
            loops: LoopPolicy::Once,
            mapper: ChannelMapper::new(),
            running: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClipAnimator {
    pub id: AnimatorId,
    pub clip_id: ClipId,
    pub clock_id: Option<ClockId>,
    pub loops: LoopPolicy,

    running: bool,
    /// Pending seek target; present means "seeking" for the next evaluation.
    seek_target: Option<f32>,
    finished: bool,

    current_loop: u32,
    last_global_time_ns: i64,
    last_local_time_ns: i64,
    last_normalized_local_time: f32,
    normalized_local_time: f32,

    mapper: ChannelMapper,
    clip_format: ClipFormat,
    mapping_data: Vec<MappingData>,
    mapping_dirty: bool,
}

impl ClipAnimator {
    pub fn new(id: AnimatorId, cfg: AnimatorCfg) -> Self {
        Self {
            id,
            clip_id: cfg.clip,
            clock_id: cfg.clock,
            loops: cfg.loops,
            running: cfg.running,
            seek_target: None,
            finished: false,
            current_loop: 0,
            last_global_time_ns: 0,
            last_local_time_ns: 0,
            last_normalized_local_time: 0.0,
            normalized_local_time: 0.0,
            mapper: cfg.mapper,
            clip_format: ClipFormat::default(),
            mapping_data: Vec::new(),
            mapping_dirty: true,
        }
    }

    /// Start (or resume) playback from the last evaluated global time.
    /// A finished animator rewinds to the beginning first.
    pub fn start(&mut self) {
        if self.finished {
            self.rewind();
        }
        self.running = true;
    }

    /// Start playback with `global_time_ns` as the reference for the next delta,
    /// so time spent stopped is not counted.
    pub fn start_at(&mut self, global_time_ns: i64) {
        self.start();
        self.last_global_time_ns = global_time_ns;
    }

    /// Stop advancing. The playhead is kept so playback can resume.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Reset the playhead to the start of the first loop.
    pub fn rewind(&mut self) {
        self.finished = false;
        self.current_loop = 0;
        self.last_local_time_ns = 0;
        self.last_normalized_local_time = 0.0;
        self.normalized_local_time = 0.0;
    }

    /// Request the playhead be placed at `normalized` on the next evaluation.
    pub fn seek(&mut self, normalized: f32) {
        let normalized = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_target = Some(normalized);
        self.finished = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_seeking(&self) -> bool {
        self.seek_target.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time source for an evaluation at `global_time_ns`, or `None` when idle.
    /// A pending seek takes precedence over advancing.
    pub fn time_source(&self, global_time_ns: i64) -> Option<TimeSource> {
        match (self.seek_target, self.running) {
            (Some(normalized), _) => Some(TimeSource::Seek { normalized }),
            (None, true) => Some(TimeSource::Advance { global_time_ns }),
            (None, false) => None,
        }
    }

    pub fn current_loop(&self) -> u32 {
        self.current_loop
    }

    pub fn last_global_time_ns(&self) -> i64 {
        self.last_global_time_ns
    }

    pub fn last_local_time_ns(&self) -> i64 {
        self.last_local_time_ns
    }

    pub fn last_normalized_local_time(&self) -> f32 {
        self.last_normalized_local_time
    }

    pub fn normalized_local_time(&self) -> f32 {
        self.normalized_local_time
    }

    pub fn mapper(&self) -> &ChannelMapper {
        &self.mapper
    }

    /// Replace the channel mapper; the layout is rebuilt before the next evaluation.
    pub fn set_mapper(&mut self, mapper: ChannelMapper) {
        self.mapper = mapper;
        self.mapping_dirty = true;
    }

    /// Bind the animator to another clip; the layout is rebuilt before the next evaluation.
    pub fn set_clip(&mut self, clip: ClipId) {
        self.clip_id = clip;
        self.mapping_dirty = true;
        self.rewind();
    }

    pub fn clip_format(&self) -> &ClipFormat {
        &self.clip_format
    }

    pub fn mapping_data(&self) -> &[MappingData] {
        &self.mapping_data
    }

    /// Install a precomputed layout, bypassing the mapper.
    pub fn set_layout(&mut self, clip_format: ClipFormat, mapping_data: Vec<MappingData>) {
        self.clip_format = clip_format;
        self.mapping_data = mapping_data;
        self.mapping_dirty = false;
    }

    pub fn invalidate_layout(&mut self) {
        self.mapping_dirty = true;
    }

    pub fn needs_layout(&self) -> bool {
        self.mapping_dirty
    }

    /// Rebuild `clip_format`/`mapping_data` from the mapper for `clip`.
    pub fn rebuild_layout(&mut self, clip: &AnimationClip, interner: &PropertyInterner) {
        let (format, data) = self.mapper.build(clip, interner);
        self.set_layout(format, data);
    }

    /// Commit the outcome of an evaluated frame.
    pub(crate) fn commit_frame(&mut self, global_time_ns: i64, phase: &ClipPhase) {
        if phase.is_final_frame {
            self.running = false;
            self.finished = true;
        }
        self.seek_target = None;
        self.current_loop = phase.current_loop;
        self.last_global_time_ns = global_time_ns;
        self.last_local_time_ns = phase.local_time_ns;
        self.last_normalized_local_time = phase.normalized_local_time;
        self.normalized_local_time = phase.normalized_local_time;
    }

    /// Stop after a content error; the pending seek is dropped so it is not retried.
    pub(crate) fn halt(&mut self) {
        self.running = false;
        self.seek_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> ClipAnimator {
        ClipAnimator::new(AnimatorId(0), AnimatorCfg::new(ClipId(0)))
    }

    #[test]
    fn idle_until_started_or_seeking() {
        let mut a = animator();
        assert_eq!(a.time_source(5), None);
        a.start();
        assert_eq!(
            a.time_source(5),
            Some(TimeSource::Advance { global_time_ns: 5 })
        );
        a.seek(0.4);
        assert_eq!(a.time_source(5), Some(TimeSource::Seek { normalized: 0.4 }));
        a.stop();
        // Seeking still evaluates a stopped animator
        assert!(a.time_source(5).is_some());
    }

    #[test]
    fn seek_target_is_sanitized() {
        let mut a = animator();
        a.seek(7.0);
        assert_eq!(a.time_source(0), Some(TimeSource::Seek { normalized: 1.0 }));
        a.seek(f32::NAN);
        assert_eq!(a.time_source(0), Some(TimeSource::Seek { normalized: 0.0 }));
    }

    #[test]
    fn final_frame_commit_stops_and_restart_rewinds() {
        let mut a = animator();
        a.start();
        a.commit_frame(
            2_000,
            &ClipPhase {
                local_time_ns: 1_000,
                normalized_local_time: 1.0,
                current_loop: 1,
                is_final_frame: true,
            },
        );
        assert!(!a.is_running());
        assert!(a.is_finished());
        assert_eq!(a.last_global_time_ns(), 2_000);

        a.start_at(9_000);
        assert!(a.is_running());
        assert_eq!(a.current_loop(), 0);
        assert_eq!(a.last_local_time_ns(), 0);
        assert_eq!(a.last_global_time_ns(), 9_000);
    }

    #[test]
    fn mapper_changes_mark_layout_dirty() {
        let mut a = animator();
        assert!(a.needs_layout());
        a.set_layout(ClipFormat::identity(2), Vec::new());
        assert!(!a.needs_layout());
        a.set_mapper(ChannelMapper::new());
        assert!(a.needs_layout());
    }
}
