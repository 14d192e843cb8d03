//! Sampled keyframes and gap filling.

use serde::{Deserialize, Serialize};

use crate::data::ShapeKeySet;

/// One sampled frame of shape-key weights.
///
/// `value` always has one slot per exported shape key. Curve-sampled frames
/// only fill the keyed indices; [`complete_key`] fills the rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    value: Vec<f32>,
    /// Indices written directly by a curve (or all of them when baked).
    keyed: Vec<bool>,
    /// Set when the whole vector came from a bake.
    baked: bool,
}

impl Keyframe {
    /// Empty keyframe over `keyed.len()` targets; `keyed` marks the indices a
    /// curve will supply.
    pub fn new(frame: f32, keyed: Vec<bool>) -> Self {
        Self {
            frame,
            value: vec![0.0; keyed.len()],
            keyed,
            baked: false,
        }
    }

    /// Keyframe holding a baked whole vector.
    pub fn baked(frame: f32, value_total: Vec<f32>) -> Self {
        let mut key = Self::new(frame, vec![true; value_total.len()]);
        key.set_value_total(value_total);
        key
    }

    /// Number of shape keys this frame targets.
    #[inline]
    pub fn target_len(&self) -> usize {
        self.keyed.len()
    }

    #[inline]
    pub fn value(&self) -> &[f32] {
        &self.value
    }

    /// Whole-vector value, if this frame was baked.
    pub fn value_total(&self) -> Option<&[f32]> {
        self.baked.then_some(self.value.as_slice())
    }

    #[inline]
    pub fn is_keyed(&self, index: usize) -> bool {
        self.keyed[index]
    }

    /// Scatter curve values into the keyed indices, in index order.
    pub fn set_keyed_values(&mut self, values: impl IntoIterator<Item = f32>) {
        let slots = self
            .keyed
            .iter()
            .zip(self.value.iter_mut())
            .filter_map(|(k, v)| k.then_some(v));
        for (slot, v) in slots.zip(values) {
            *slot = v;
        }
    }

    /// Replace the whole vector (bake result).
    pub fn set_value_total(&mut self, value_total: Vec<f32>) {
        self.keyed = vec![true; value_total.len()];
        self.value = value_total;
        self.baked = true;
    }

    /// # Panics
    /// If `index >= target_len()`.
    #[inline]
    pub fn set_value_index(&mut self, index: usize, v: f32) {
        self.value[index] = v;
    }
}

/// Fallback value per exported shape key for channels without a curve.
#[derive(Clone, Debug, PartialEq)]
pub struct NonKeyedValues(pub Vec<f32>);

impl NonKeyedValues {
    /// Current values of the exported shape keys.
    pub fn from_shape_keys(keys: &ShapeKeySet) -> Self {
        Self(keys.exported().map(|b| b.value).collect())
    }
}

/// Fill every index not supplied by a curve from `non_keyed`.
/// Keyed indices are never touched.
///
/// # Panics
/// If `non_keyed` is shorter than the keyframe's target count.
pub fn complete_key(key: &mut Keyframe, non_keyed: &NonKeyedValues) {
    for i in 0..key.target_len() {
        if key.is_keyed(i) {
            continue;
        }
        key.set_value_index(i, non_keyed.0[i]);
    }
}

/// Export keyframes as serde_json::Value (`{ "frames": [..], "values": [[..]] }`).
pub fn export_keyframes_json(keyframes: &[Keyframe]) -> serde_json::Value {
    let frames: Vec<f32> = keyframes.iter().map(|k| k.frame).collect();
    let values: Vec<&[f32]> = keyframes.iter().map(|k| k.value()).collect();
    serde_json::json!({
        "frames": frames,
        "values": values,
    })
}
