//! Per-frame bake cache.
//!
//! Lookups are keyed by `(entity kind, object, bone, action, frame, step, slot)`.
//! A miss bakes the whole frame range of the (object, action, slot, step) group
//! at once through [`ShapeKeyHost::evaluate_shape_keys`], so later frames of the
//! same group are plain lookups. The cache lives for one export session.

use hashbrown::HashMap;
use log::trace;

use crate::config::ExportSettings;
use crate::error::SampleError;
use crate::host::ShapeKeyHost;
use crate::ids::{ObjectId, SlotId};

/// Kind of entity a cached vector belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    /// Shape-key weights of a mesh object.
    ShapeKeys,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ShapeKeys => "sk",
        }
    }
}

/// Full lookup key for one cached frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub object: ObjectId,
    /// Always `None` for shape keys.
    pub bone: Option<String>,
    pub action: Option<String>,
    pub frame: f32,
    pub step: f32,
    pub slot: Option<SlotId>,
}

impl CacheKey {
    pub fn shape_keys(
        object: &ObjectId,
        action: Option<&str>,
        frame: f32,
        step: f32,
        slot: Option<&SlotId>,
    ) -> Self {
        Self {
            kind: EntityKind::ShapeKeys,
            object: object.clone(),
            bone: None,
            action: action.map(str::to_string),
            frame,
            step,
            slot: slot.cloned(),
        }
    }

    fn group(&self) -> GroupKey {
        GroupKey {
            kind: self.kind,
            object: self.object.clone(),
            bone: self.bone.clone(),
            action: self.action.clone(),
            step_bits: self.step.to_bits(),
            slot: self.slot.clone(),
        }
    }
}

/// Everything in a [`CacheKey`] except the frame; one bake fills one group.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct GroupKey {
    kind: EntityKind,
    object: ObjectId,
    bone: Option<String>,
    action: Option<String>,
    step_bits: u32,
    slot: Option<SlotId>,
}

/// Baked frames of one group, keyed by the frame's bit pattern. Frames are
/// always produced as `start + i * step`, so bit-exact keys match.
type BakedFrames = HashMap<u32, Vec<f32>>;

#[derive(Debug, Default)]
pub struct SampleCache {
    groups: HashMap<GroupKey, BakedFrames>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of baked groups held.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Cached vector for `key`, baking its group on first access.
    pub fn get_cache_data<H: ShapeKeyHost>(
        &mut self,
        host: &H,
        settings: &ExportSettings,
        key: &CacheKey,
    ) -> Result<Vec<f32>, SampleError> {
        let group = key.group();
        if !self.groups.contains_key(&group) {
            let baked = Self::bake(host, settings, key)?;
            self.groups.insert(group.clone(), baked);
        }
        self.groups
            .get(&group)
            .and_then(|frames| frames.get(&key.frame.to_bits()))
            .cloned()
            .ok_or_else(|| SampleError::CacheMiss {
                object: key.object.clone(),
                frame: key.frame,
            })
    }

    fn bake<H: ShapeKeyHost>(
        host: &H,
        settings: &ExportSettings,
        key: &CacheKey,
    ) -> Result<BakedFrames, SampleError> {
        let action = key.action.as_deref();
        let range = settings.resolve_range(&key.object, action)?;
        let count = range.frame_count(key.step)?;
        trace!(
            "baking {} for '{}' ({:?}): {} frames from {}",
            key.kind.as_str(),
            key.object,
            action,
            count,
            range.start
        );
        let mut frames = BakedFrames::with_capacity(count);
        for i in 0..count {
            let frame = range.frame_at(i, key.step);
            let values = host.evaluate_shape_keys(&key.object, action, key.slot.as_ref(), frame)?;
            frames.insert(frame.to_bits(), values);
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameRange;
    use crate::data::{ShapeKeyBlock, ShapeKeySet};
    use crate::scene::{Scene, SceneObject};

    fn setup() -> (Scene, ExportSettings, ObjectId) {
        let obj = ObjectId::from("Mesh");
        let scene = Scene::new().with_object(
            "Mesh",
            SceneObject {
                shape_keys: Some(ShapeKeySet::new(vec![
                    ShapeKeyBlock::new("Basis", 0.0),
                    ShapeKeyBlock::new("A", 0.5),
                ])),
                ..Default::default()
            },
        );
        let mut settings = ExportSettings::default();
        settings
            .ranges
            .insert(obj.clone(), None, FrameRange::new(0.0, 4.0));
        (scene, settings, obj)
    }

    #[test]
    fn miss_bakes_the_whole_group_once() {
        let (scene, settings, obj) = setup();
        let mut cache = SampleCache::new();
        assert!(cache.is_empty());
        let v = cache
            .get_cache_data(&scene, &settings, &CacheKey::shape_keys(&obj, None, 2.0, 1.0, None))
            .unwrap();
        assert_eq!(v, vec![0.5]);
        assert_eq!(cache.len(), 1);
        cache
            .get_cache_data(&scene, &settings, &CacheKey::shape_keys(&obj, None, 4.0, 1.0, None))
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(EntityKind::ShapeKeys.as_str(), "sk");
    }

    #[test]
    fn frame_outside_baked_range_is_a_miss() {
        let (scene, settings, obj) = setup();
        let mut cache = SampleCache::new();
        let err = cache
            .get_cache_data(&scene, &settings, &CacheKey::shape_keys(&obj, None, 7.0, 1.0, None))
            .unwrap_err();
        assert_eq!(err, SampleError::CacheMiss { object: obj, frame: 7.0 });
    }
}
