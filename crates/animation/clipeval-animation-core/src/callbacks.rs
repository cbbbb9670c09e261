//! Animation callbacks.
//!
//! Value callbacks are attached to channel mappings and fire with every new
//! property value; final-frame callbacks are attached to an animator and fire
//! once when its playback terminates. The evaluation job only builds the list
//! of invocations; where they run is decided by the caller using each
//! invocation's `DispatchMode`.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::EvalResult;
use crate::ids::{AnimatorId, CallbackId, IdAllocator, NodeId};
use crate::mapping::MappingData;
use crate::outputs::value_for_mapping;
use clipeval_api_core::{TypedPath, Value};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Safe to run on the evaluating thread right after the frame.
    #[default]
    Immediate,
    /// Must be posted to the owning (e.g. UI) thread by the host.
    Deferred,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallbackEvent {
    ValueChanged {
        animator: AnimatorId,
        target: NodeId,
        path: TypedPath,
        value: Value,
    },
    FinalFrame {
        animator: AnimatorId,
        normalized_time: f32,
    },
}

pub type CallbackFn = Arc<dyn Fn(&CallbackEvent) + Send + Sync>;

#[derive(Clone)]
struct Registered {
    func: CallbackFn,
    mode: DispatchMode,
}

/// Registered callbacks, read by the formatter to build per-frame invocation lists.
#[derive(Default)]
pub struct CallbackRegistry {
    ids: IdAllocator,
    value_callbacks: HashMap<CallbackId, Registered>,
    final_frame: HashMap<AnimatorId, Vec<Registered>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("value_callbacks", &self.value_callbacks.len())
            .field("final_frame", &self.final_frame.len())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value callback; attach the returned id to a `ChannelMapping`.
    pub fn register_value<F>(&mut self, mode: DispatchMode, func: F) -> CallbackId
    where
        F: Fn(&CallbackEvent) + Send + Sync + 'static,
    {
        let id = self.ids.alloc_callback();
        self.value_callbacks.insert(
            id,
            Registered {
                func: Arc::new(func),
                mode,
            },
        );
        id
    }

    pub fn unregister_value(&mut self, id: CallbackId) -> bool {
        self.value_callbacks.remove(&id).is_some()
    }

    pub fn register_final_frame<F>(&mut self, animator: AnimatorId, mode: DispatchMode, func: F)
    where
        F: Fn(&CallbackEvent) + Send + Sync + 'static,
    {
        self.final_frame.entry(animator).or_default().push(Registered {
            func: Arc::new(func),
            mode,
        });
    }

    /// Drop every final-frame callback of an animator.
    pub fn clear_final_frame(&mut self, animator: AnimatorId) {
        self.final_frame.remove(&animator);
    }

    fn value_callback(&self, id: CallbackId) -> Option<&Registered> {
        self.value_callbacks.get(&id)
    }

    fn final_frame_callbacks(&self, animator: AnimatorId) -> &[Registered] {
        self.final_frame
            .get(&animator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A callback bound to the event it should receive.
#[derive(Clone)]
pub struct CallbackInvocation {
    pub mode: DispatchMode,
    pub event: CallbackEvent,
    func: CallbackFn,
}

impl CallbackInvocation {
    pub fn invoke(&self) {
        (self.func)(&self.event);
    }
}

impl fmt::Debug for CallbackInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackInvocation")
            .field("mode", &self.mode)
            .field("event", &self.event)
            .finish()
    }
}

/// Build the callback invocations for one animator frame.
///
/// Value callbacks fire for every driven mapping that names a registered
/// callback; final-frame callbacks fire when `is_final_frame` is set.
pub fn prepare_callbacks(
    animator: AnimatorId,
    mapping_data: &[MappingData],
    formatted: &[f32],
    is_final_frame: bool,
    normalized_time: f32,
    registry: &CallbackRegistry,
) -> EvalResult<Vec<CallbackInvocation>> {
    let mut out = Vec::new();
    for mapping in mapping_data.iter().filter(|m| m.driven) {
        let Some(id) = mapping.callback else {
            continue;
        };
        let Some(registered) = registry.value_callback(id) else {
            log::debug!("callback {id:?} on {} is not registered", mapping.property);
            continue;
        };
        out.push(CallbackInvocation {
            mode: registered.mode,
            event: CallbackEvent::ValueChanged {
                animator,
                target: mapping.target,
                path: mapping.property.clone(),
                value: value_for_mapping(mapping, formatted)?,
            },
            func: Arc::clone(&registered.func),
        });
    }

    if is_final_frame {
        for registered in registry.final_frame_callbacks(animator) {
            out.push(CallbackInvocation {
                mode: registered.mode,
                event: CallbackEvent::FinalFrame {
                    animator,
                    normalized_time,
                },
                func: Arc::clone(&registered.func),
            });
        }
    }
    Ok(out)
}
