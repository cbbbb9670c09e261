//! Output contracts from the evaluation job.
//!
//! An `AnimationRecord` carries the property values produced for one animator
//! this frame plus the playback state the frontend mirrors (normalized time,
//! and whether the animator just finished). Hosts apply records through a
//! `PropertySink`.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::ids::{AnimatorId, NodeId, PropertyId};
use crate::mapping::MappingData;
use clipeval_api_core::{TypedPath, Value};

/// One property value for a scene-graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    pub target: NodeId,
    pub path: TypedPath,
    pub property_id: PropertyId,
    pub value: Value,
}

/// Everything the frontend needs to mirror one animator's frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationRecord {
    pub animator: Option<AnimatorId>,
    pub normalized_time: f32,
    /// Set on the final frame; the frontend flips the animator's running property off.
    pub final_frame: bool,
    #[serde(default)]
    pub updates: Vec<PropertyUpdate>,
}

impl AnimationRecord {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && !self.final_frame
    }

    pub fn update_for(&self, target: NodeId, path: &str) -> Option<&PropertyUpdate> {
        self.updates
            .iter()
            .find(|u| u.target == target && u.path.to_string() == path)
    }
}

/// Collect the slots of one mapping from `formatted` and pack them into a value.
pub(crate) fn value_for_mapping(mapping: &MappingData, formatted: &[f32]) -> EvalResult<Value> {
    let mut components = Vec::with_capacity(mapping.slots.len());
    for &slot in &mapping.slots {
        let v = formatted
            .get(slot)
            .copied()
            .ok_or(EvalError::InvalidChannelMapping {
                slot,
                source_index: slot,
                channel_count: formatted.len(),
            })?;
        components.push(v);
    }
    Value::from_components(mapping.kind, &components).ok_or_else(|| {
        EvalError::InvalidChannelMapping {
            slot: mapping.slots.first().copied().unwrap_or(0),
            source_index: components.len(),
            channel_count: mapping.kind.component_count(),
        }
    })
}

/// Build the property-update record for one animator frame.
///
/// Mappings whose channel the clip does not drive produce no update.
pub fn prepare_animation_record(
    animator: AnimatorId,
    mapping_data: &[MappingData],
    formatted: &[f32],
    final_frame: bool,
    normalized_time: f32,
) -> EvalResult<AnimationRecord> {
    let mut updates = Vec::with_capacity(mapping_data.len());
    for mapping in mapping_data.iter().filter(|m| m.driven) {
        updates.push(PropertyUpdate {
            target: mapping.target,
            path: mapping.property.clone(),
            property_id: mapping.property_id,
            value: value_for_mapping(mapping, formatted)?,
        });
    }
    Ok(AnimationRecord {
        animator: Some(animator),
        normalized_time,
        final_frame,
        updates,
    })
}
