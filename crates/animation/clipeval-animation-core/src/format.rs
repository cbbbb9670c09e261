//! Reformat raw clip results into an animator's channel layout.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::sampling::ClipResults;

/// Ordered mapping from destination slot to raw clip channel index.
///
/// `None` marks a slot the clip does not drive (sparse mapping); such slots
/// format to `0.0` and are expected to be ignored by the mapping that owns them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipFormat {
    pub source_clip_indices: Vec<Option<usize>>,
}

impl ClipFormat {
    /// Dense format where every slot reads a raw channel.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            source_clip_indices: indices.into_iter().map(Some).collect(),
        }
    }

    /// Identity layout for a clip with `width` raw channels.
    pub fn identity(width: usize) -> Self {
        Self::from_indices(0..width)
    }

    pub fn slot_count(&self) -> usize {
        self.source_clip_indices.len()
    }
}

/// `formatted[i] = raw[format.source_clip_indices[i]]`.
///
/// Slots may repeat or skip raw channels. An index outside `raw` is a content
/// error and fails the whole frame with `InvalidChannelMapping`.
pub fn format_clip_results(raw: &[f32], format: &ClipFormat) -> EvalResult<ClipResults> {
    let mut out = Vec::with_capacity(format.slot_count());
    for (slot, src) in format.source_clip_indices.iter().enumerate() {
        let value = match *src {
            Some(source_index) => match raw.get(source_index) {
                Some(v) => *v,
                None => {
                    return Err(EvalError::InvalidChannelMapping {
                        slot,
                        source_index,
                        channel_count: raw.len(),
                    })
                }
            },
            None => 0.0,
        };
        out.push(value);
    }
    Ok(out)
}
