//! Export session: memoized shape-key collection.
//!
//! Results are memoized per `(object, action, slot)` for the lifetime of the
//! session. The settings are fixed when the session starts, so the key covers
//! the full argument tuple of a collect call. Repeated requests return the
//! same shared sequence; callers treat it as read-only.

use std::rc::Rc;

use hashbrown::HashMap;
use log::trace;

use crate::config::ExportSettings;
use crate::error::SampleError;
use crate::host::ShapeKeyHost;
use crate::ids::{ObjectId, SlotId};
use crate::keyframe::Keyframe;
use crate::sampler::collect;
use crate::sampling_cache::SampleCache;

type MemoKey = (ObjectId, Option<String>, Option<SlotId>);

/// Shared, immutable sampling result. `None` means nothing to export.
pub type Collected = Option<Rc<[Keyframe]>>;

#[derive(Debug)]
pub struct ExportSession<'h, H: ShapeKeyHost> {
    host: &'h H,
    settings: ExportSettings,
    cache: SampleCache,
    memo: HashMap<MemoKey, Collected>,
}

impl<'h, H: ShapeKeyHost> ExportSession<'h, H> {
    pub fn new(host: &'h H, settings: ExportSettings) -> Self {
        Self {
            host,
            settings,
            cache: SampleCache::new(),
            memo: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Sample shape keys of `object`, memoized for the session.
    /// Errors are not memoized.
    pub fn collect(
        &mut self,
        object: &ObjectId,
        action: Option<&str>,
        slot: Option<&SlotId>,
    ) -> Result<Collected, SampleError> {
        let key: MemoKey = (object.clone(), action.map(str::to_string), slot.cloned());
        if let Some(hit) = self.memo.get(&key) {
            trace!("memo hit for '{object}' ({action:?})");
            return Ok(hit.clone());
        }
        let collected: Collected = collect(
            self.host,
            &self.settings,
            &mut self.cache,
            object,
            action,
            slot,
        )?
        .map(Rc::from);
        self.memo.insert(key, collected.clone());
        Ok(collected)
    }

    /// Number of memoized results.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    /// Drop all memoized results and baked frames.
    pub fn invalidate(&mut self) {
        self.memo.clear();
        self.cache.clear();
    }

    /// End the session, returning its settings.
    pub fn finish(mut self) -> ExportSettings {
        self.invalidate();
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameRange;
    use crate::data::{ShapeKeyBlock, ShapeKeySet};
    use crate::scene::{Scene, SceneObject};

    fn scene() -> Scene {
        Scene::new().with_object(
            "Mesh",
            SceneObject {
                shape_keys: Some(ShapeKeySet::new(vec![
                    ShapeKeyBlock::new("Basis", 0.0),
                    ShapeKeyBlock::new("A", 0.2),
                ])),
                ..Default::default()
            },
        )
    }

    fn settings() -> ExportSettings {
        let mut s = ExportSettings::default();
        s.ranges
            .insert(ObjectId::from("Mesh"), None, FrameRange::new(1.0, 5.0));
        s
    }

    #[test]
    fn repeated_calls_share_the_result() {
        let scene = scene();
        let mut session = ExportSession::new(&scene, settings());
        let mesh = ObjectId::from("Mesh");
        let a = session.collect(&mesh, None, None).unwrap().unwrap();
        let b = session.collect(&mesh, None, None).unwrap().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(session.memoized(), 1);
        // Constant bake collapses to first/last.
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].frame, 5.0);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let scene = scene();
        let mut session = ExportSession::new(&scene, settings());
        let mesh = ObjectId::from("Mesh");
        let a = session.collect(&mesh, None, None).unwrap().unwrap();
        session.invalidate();
        assert_eq!(session.memoized(), 0);
        let b = session.collect(&mesh, None, None).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(&a[..], &b[..]);
        let settings = session.finish();
        assert_eq!(settings.frame_step, 1.0);
    }

    #[test]
    fn errors_are_not_memoized() {
        let scene = scene();
        let mut session = ExportSession::new(&scene, settings());
        let err = session
            .collect(&ObjectId::from("Ghost"), None, None)
            .unwrap_err();
        assert!(matches!(err, SampleError::MissingRange { .. }));
        assert_eq!(session.memoized(), 0);
    }
}
