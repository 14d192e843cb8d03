//! Channel-group resolution: which curve animates each exported shape key.

use crate::curve::FCurve;
use crate::data::{parse_shape_key_data_path, ActionSlot, ShapeKeySet};
use crate::error::SampleError;
use crate::host::ShapeKeyHost;
use crate::ids::{ObjectId, SlotId};

/// Curves indexed by exported shape-key position; `None` for unanimated keys.
/// Borrowed from the host for the duration of one sampling pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelGroup<'a> {
    pub channels: Vec<Option<&'a FCurve>>,
}

impl<'a> ChannelGroup<'a> {
    /// A group with `len` unanimated channels.
    pub fn unanimated(len: usize) -> Self {
        Self {
            channels: vec![None; len],
        }
    }

    /// Match the slot's shape-key curves against the exported shape keys.
    /// Curves on other data paths are ignored.
    pub fn from_slot(keys: &ShapeKeySet, slot: &'a ActionSlot) -> Self {
        let named: Vec<(&str, &'a FCurve)> = slot
            .fcurves
            .iter()
            .filter_map(|c| parse_shape_key_data_path(&c.data_path).map(|name| (name, c)))
            .collect();
        let channels = keys
            .exported()
            .map(|block| {
                named
                    .iter()
                    .find(|(name, _)| *name == block.name)
                    .map(|(_, c)| *c)
            })
            .collect();
        Self { channels }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of channels backed by a curve.
    pub fn animated_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    /// Mask of animated indices.
    pub fn keyed_mask(&self) -> Vec<bool> {
        self.channels.iter().map(Option::is_some).collect()
    }

    /// Evaluate every present curve at `frame`, in channel order.
    pub fn evaluate(&self, frame: f32) -> impl Iterator<Item = f32> + '_ {
        self.channels.iter().flatten().map(move |c| c.evaluate(frame))
    }
}

/// Resolve the channel group for `object`. Without a slot there is nothing to
/// read curves from, so every channel is left unanimated (bake situation).
pub fn resolve_channel_group<'h, H: ShapeKeyHost>(
    host: &'h H,
    object: &ObjectId,
    action_name: Option<&str>,
    slot: Option<&SlotId>,
) -> Result<ChannelGroup<'h>, SampleError> {
    let keys = host.shape_keys(object)?;
    let Some(slot_id) = slot else {
        return Ok(ChannelGroup::unanimated(keys.exported_count()));
    };
    let Some(action) = host.resolved_action(object, action_name).action() else {
        return Ok(ChannelGroup::unanimated(keys.exported_count()));
    };
    let slot = action
        .slot(slot_id)
        .ok_or_else(|| SampleError::UnknownSlot {
            action: action.name.clone(),
            slot: slot_id.clone(),
        })?;
    Ok(ChannelGroup::from_slot(keys, slot))
}
