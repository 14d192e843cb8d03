//! Capability interface over the host scene.
//!
//! Adapters (a DCC plugin, a test scene) implement [`ShapeKeyHost`] and hand it
//! to the sampler. Queries return tagged results instead of optional chains so
//! the sampler can pick a strategy once per call.

use crate::data::{Action, ShapeKeyDriver, ShapeKeySet};
use crate::error::SampleError;
use crate::ids::{ObjectId, SlotId};

/// Where the shape-key action for a sampling request comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResolvedAction<'a> {
    /// The action requested by name, found in the host's action library.
    Named(&'a Action),
    /// The action currently assigned to the object's shape keys.
    Assigned(&'a Action),
    /// No action is available.
    None,
}

impl<'a> ResolvedAction<'a> {
    pub fn action(&self) -> Option<&'a Action> {
        match *self {
            ResolvedAction::Named(a) | ResolvedAction::Assigned(a) => Some(a),
            ResolvedAction::None => None,
        }
    }
}

/// Drivers that feed the object's shape keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverBinding<'a> {
    None,
    /// Shape keys driven by custom properties; the drivers are listed in
    /// exported shape-key order where present.
    CustomProperty(&'a [ShapeKeyDriver]),
}

impl DriverBinding<'_> {
    #[inline]
    pub fn is_driven(&self) -> bool {
        matches!(self, DriverBinding::CustomProperty(d) if !d.is_empty())
    }
}

/// Read-only view of the host scene needed to sample shape keys.
pub trait ShapeKeyHost {
    /// Shape keys of `object`.
    ///
    /// Fails with [`SampleError::UnknownObject`] or [`SampleError::NoShapeKeys`].
    fn shape_keys(&self, object: &ObjectId) -> Result<&ShapeKeySet, SampleError>;

    /// Custom-property drivers on the object's shape keys.
    fn driver(&self, object: &ObjectId) -> DriverBinding<'_>;

    /// Resolve the action to read curves from: the named one if the library has
    /// it, else the object's assigned shape-key action.
    fn resolved_action(&self, object: &ObjectId, action_name: Option<&str>) -> ResolvedAction<'_>;

    /// Evaluate every exported shape key of `object` at `frame`, drivers applied,
    /// in exported order. This is the per-frame bake.
    fn evaluate_shape_keys(
        &self,
        object: &ObjectId,
        action_name: Option<&str>,
        slot: Option<&SlotId>,
        frame: f32,
    ) -> Result<Vec<f32>, SampleError>;

    /// Whether `object` has shape keys that are animated by an action or a driver.
    fn has_shape_key_animation(&self, object: &ObjectId) -> bool {
        self.shape_keys(object).is_ok()
            && (self.driver(object).is_driven()
                || self.resolved_action(object, None).action().is_some())
    }
}
