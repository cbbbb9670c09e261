//! Collaborator traits the evaluation job reads from, and in-memory implementations.
//!
//! Hosts with their own resource managers implement `ClipLookup`/`ClockLookup`
//! and pass them into `evaluate_clip_animator`; `Engine` uses the in-memory
//! `ClipLibrary`/`ClockRegistry` below.

use hashbrown::HashMap;

use crate::clock::Clock;
use crate::data::AnimationClip;
use crate::ids::{ClipId, ClockId};
use crate::outputs::AnimationRecord;

pub trait ClipLookup {
    fn lookup_clip(&self, id: ClipId) -> Option<&AnimationClip>;
}

pub trait ClockLookup {
    fn lookup_clock(&self, id: ClockId) -> Option<&Clock>;
}

/// Receives property-update records for the frontend representation.
pub trait PropertySink {
    fn apply(&mut self, record: &AnimationRecord);
}

/// Monotonically non-decreasing simulation time.
pub trait SimulationClock {
    fn global_time_ns(&self) -> i64;
}

/// Clip storage keyed by id.
#[derive(Default, Debug)]
pub struct ClipLibrary {
    items: HashMap<ClipId, AnimationClip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ClipId, clip: AnimationClip) {
        self.items.insert(id, clip);
    }

    pub fn remove(&mut self, id: ClipId) -> Option<AnimationClip> {
        self.items.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ClipLookup for ClipLibrary {
    fn lookup_clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.items.get(&id)
    }
}

#[derive(Default, Debug)]
pub struct ClockRegistry {
    items: HashMap<ClockId, Clock>,
}

impl ClockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ClockId, clock: Clock) {
        self.items.insert(id, clock);
    }

    pub fn get_mut(&mut self, id: ClockId) -> Option<&mut Clock> {
        self.items.get_mut(&id)
    }

    pub fn remove(&mut self, id: ClockId) -> Option<Clock> {
        self.items.remove(&id)
    }
}

impl ClockLookup for ClockRegistry {
    fn lookup_clock(&self, id: ClockId) -> Option<&Clock> {
        self.items.get(&id)
    }
}

/// Sink that keeps every record it receives (tests, tooling, replay).
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub records: Vec<AnimationRecord>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&AnimationRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl PropertySink for RecordingSink {
    fn apply(&mut self, record: &AnimationRecord) {
        self.records.push(record.clone());
    }
}

/// Host-driven simulation time, advanced explicitly.
#[derive(Copy, Clone, Default, Debug)]
pub struct ManualClock {
    now_ns: i64,
}

impl ManualClock {
    pub fn new(now_ns: i64) -> Self {
        Self { now_ns }
    }

    /// Advance by `delta_ns`; negative deltas are ignored to keep time monotonic.
    pub fn advance(&mut self, delta_ns: i64) -> i64 {
        self.now_ns = self.now_ns.saturating_add(delta_ns.max(0));
        self.now_ns
    }
}

impl SimulationClock for ManualClock {
    fn global_time_ns(&self) -> i64 {
        self.now_ns
    }
}
