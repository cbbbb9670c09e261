//! Channel mapper: binds clip channels to scene-graph node properties.
//!
//! A mapper holds an ordered list of mappings. Building it against a clip
//! produces the animator's `ClipFormat` (slot -> raw channel) and one
//! `MappingData` row per mapping describing which formatted slots form the
//! property value.

use serde::{Deserialize, Serialize};

use crate::data::AnimationClip;
use crate::format::ClipFormat;
use crate::ids::{CallbackId, NodeId, PropertyId};
use crate::interner::PropertyInterner;
use clipeval_api_core::{TypedPath, ValueKind};

/// One clip channel -> one node property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelMapping {
    /// Clip channel name, e.g. "Location".
    pub channel_name: String,
    pub target: NodeId,
    pub property: TypedPath,
    pub kind: ValueKind,
    /// Value callback notified with each new property value.
    #[serde(default)]
    pub callback: Option<CallbackId>,
}

impl ChannelMapping {
    pub fn new(
        channel_name: impl Into<String>,
        target: NodeId,
        property: TypedPath,
        kind: ValueKind,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            target,
            property,
            kind,
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: CallbackId) -> Self {
        self.callback = Some(callback);
        self
    }

    fn same_binding(&self, other: &ChannelMapping) -> bool {
        self.channel_name == other.channel_name
            && self.target == other.target
            && self.property == other.property
    }
}

/// Resolved mapping: which formatted slots make up a property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MappingData {
    pub target: NodeId,
    pub property: TypedPath,
    pub property_id: PropertyId,
    pub kind: ValueKind,
    /// Formatted-slot indices, one per component of `kind`.
    pub slots: Vec<usize>,
    pub callback: Option<CallbackId>,
    /// False when the clip has none of this mapping's channel components.
    pub driven: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMapper {
    mappings: Vec<ChannelMapping>,
}

impl ChannelMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: impl IntoIterator<Item = ChannelMapping>) -> Self {
        let mut mapper = Self::new();
        for m in mappings {
            mapper.add_mapping(m);
        }
        mapper
    }

    /// Append a mapping. Returns false if the same channel -> property binding already exists.
    pub fn add_mapping(&mut self, mapping: ChannelMapping) -> bool {
        if self.mappings.iter().any(|m| m.same_binding(&mapping)) {
            return false;
        }
        self.mappings.push(mapping);
        true
    }

    /// Remove a binding. Returns false if it was not present.
    pub fn remove_mapping(&mut self, mapping: &ChannelMapping) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|m| !m.same_binding(mapping));
        self.mappings.len() != before
    }

    pub fn mappings(&self) -> &[ChannelMapping] {
        &self.mappings
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Lay out formatted slots for `clip`.
    ///
    /// Each mapping takes `kind.component_count()` consecutive slots. A
    /// component is resolved by suffix name first ("X", "W", ...), then by
    /// position within the channel; unresolved components become sparse slots.
    pub fn build(
        &self,
        clip: &AnimationClip,
        interner: &PropertyInterner,
    ) -> (ClipFormat, Vec<MappingData>) {
        let mut format = ClipFormat::default();
        let mut data = Vec::with_capacity(self.mappings.len());

        for mapping in &self.mappings {
            let width = mapping.kind.component_count();
            let first_slot = format.source_clip_indices.len();
            let range = clip.channel_range(&mapping.channel_name);
            let names = mapping.kind.component_names();

            for i in 0..width {
                let by_name = names
                    .and_then(|n| n.get(i))
                    .and_then(|suffix| clip.raw_index_of(&mapping.channel_name, suffix));
                let by_position = range.and_then(|(base, count)| (i < count).then_some(base + i));
                format.source_clip_indices.push(by_name.or(by_position));
            }

            let slots: Vec<usize> = (first_slot..first_slot + width).collect();
            let driven = slots
                .iter()
                .any(|s| format.source_clip_indices[*s].is_some());
            if !driven {
                log::debug!(
                    "clip '{}' has no channel '{}' for {}",
                    clip.name,
                    mapping.channel_name,
                    mapping.property
                );
            }
            data.push(MappingData {
                target: mapping.target,
                property: mapping.property.clone(),
                property_id: interner.intern(&mapping.property.to_string()),
                kind: mapping.kind,
                slots,
                callback: mapping.callback,
                driven,
            });
        }

        (format, data)
    }
}
