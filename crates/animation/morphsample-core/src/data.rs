//! Host-side data model: shape-key blocks, actions and drivers.

use serde::{Deserialize, Serialize};

use crate::curve::FCurve;
use crate::ids::SlotId;

/// One shape key (morph target) on a mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeyBlock {
    pub name: String,
    /// Current value, used as the fallback for unanimated keys.
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub slider_min: f32,
    #[serde(default = "default_slider_max")]
    pub slider_max: f32,
    #[serde(default)]
    pub mute: bool,
    /// Name of the key this one is relative to; `None` means the basis.
    #[serde(default)]
    pub relative_key: Option<String>,
}

fn default_slider_max() -> f32 {
    1.0
}

impl ShapeKeyBlock {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
            slider_min: 0.0,
            slider_max: 1.0,
            mute: false,
            relative_key: None,
        }
    }

    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.slider_min, self.slider_max.max(self.slider_min))
    }
}

/// Ordered shape-key blocks of a mesh; the first block is the basis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeySet {
    pub blocks: Vec<ShapeKeyBlock>,
}

impl ShapeKeySet {
    pub fn new(blocks: Vec<ShapeKeyBlock>) -> Self {
        Self { blocks }
    }

    /// Whether `block` is written to the morph targets. The basis, keys relative
    /// to themselves and muted keys are skipped.
    fn is_exported(&self, index: usize, block: &ShapeKeyBlock) -> bool {
        index != 0 && block.relative_key.as_deref() != Some(block.name.as_str()) && !block.mute
    }

    /// Exported shape keys, in order.
    pub fn exported(&self) -> impl Iterator<Item = &ShapeKeyBlock> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(i, b)| self.is_exported(*i, b))
            .map(|(_, b)| b)
    }

    pub fn exported_count(&self) -> usize {
        self.exported().count()
    }
}

/// Data path animating the value of shape key `name`.
pub fn shape_key_data_path(name: &str) -> String {
    format!("key_blocks[\"{name}\"].value")
}

/// Data path of custom property `name`.
pub fn custom_property_data_path(name: &str) -> String {
    format!("[\"{name}\"]")
}

/// Shape-key name addressed by a `key_blocks["..."].value` path.
pub fn parse_shape_key_data_path(path: &str) -> Option<&str> {
    path.strip_prefix("key_blocks[\"")?.strip_suffix("\"].value")
}

/// A sub-animation inside an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionSlot {
    pub identifier: SlotId,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

impl ActionSlot {
    pub fn fcurve(&self, data_path: &str) -> Option<&FCurve> {
        self.fcurves.iter().find(|c| c.data_path == data_path)
    }
}

/// A named animation clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub slots: Vec<ActionSlot>,
}

impl Action {
    pub fn slot(&self, identifier: &SlotId) -> Option<&ActionSlot> {
        self.slots.iter().find(|s| &s.identifier == identifier)
    }
}

/// Driver binding a shape key's value to a custom property of its object:
/// `value = property * scale + offset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeyDriver {
    pub shape_key: String,
    pub property: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub offset: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl ShapeKeyDriver {
    #[inline]
    pub fn apply(&self, property_value: f32) -> f32 {
        property_value * self.scale + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_keys_skip_basis_muted_and_self_relative() {
        let mut muted = ShapeKeyBlock::new("Muted", 0.0);
        muted.mute = true;
        let mut selfrel = ShapeKeyBlock::new("Loop", 0.0);
        selfrel.relative_key = Some("Loop".into());
        let set = ShapeKeySet::new(vec![
            ShapeKeyBlock::new("Basis", 0.0),
            ShapeKeyBlock::new("Smile", 0.2),
            muted,
            selfrel,
            ShapeKeyBlock::new("Blink", 0.0),
        ]);
        let names: Vec<_> = set.exported().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Smile", "Blink"]);
        assert_eq!(set.exported_count(), 2);
    }

    #[test]
    fn data_paths_round_trip() {
        let p = shape_key_data_path("Jaw Open");
        assert_eq!(p, "key_blocks[\"Jaw Open\"].value");
        assert_eq!(parse_shape_key_data_path(&p), Some("Jaw Open"));
        assert_eq!(parse_shape_key_data_path("[\"prop\"]"), None);
        assert_eq!(custom_property_data_path("prop"), "[\"prop\"]");
    }
}
