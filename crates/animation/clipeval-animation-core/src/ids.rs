//! Identifiers and a simple allocator for engine-owned entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClockId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimatorId(pub u32);

/// Scene-graph node that receives property updates. Allocated by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CallbackId(pub u32);

/// Interned destination property name (see `interner`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u32);

/// Monotonic allocator for engine-owned ids. IDs are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_clip: u32,
    next_clock: u32,
    next_animator: u32,
    next_callback: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_clip(&mut self) -> ClipId {
        let id = ClipId(self.next_clip);
        self.next_clip = self.next_clip.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_clock(&mut self) -> ClockId {
        let id = ClockId(self.next_clock);
        self.next_clock = self.next_clock.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_animator(&mut self) -> AnimatorId {
        let id = AnimatorId(self.next_animator);
        self.next_animator = self.next_animator.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_callback(&mut self) -> CallbackId {
        let id = CallbackId(self.next_callback);
        self.next_callback = self.next_callback.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic_per_kind() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_clip(), ClipId(0));
        assert_eq!(alloc.alloc_clip(), ClipId(1));
        assert_eq!(alloc.alloc_clock(), ClockId(0));
        assert_eq!(alloc.alloc_animator(), AnimatorId(0));
        assert_eq!(alloc.alloc_animator(), AnimatorId(1));
        assert_eq!(alloc.alloc_callback(), CallbackId(0));
    }
}
