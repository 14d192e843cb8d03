//! In-memory reference host.
//!
//! `Scene` is a plain serde model of objects, shape keys, drivers and an
//! action library. It backs the tests and fixtures and doubles as a template
//! for real adapters.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::{
    custom_property_data_path, shape_key_data_path, Action, ActionSlot, ShapeKeyDriver,
    ShapeKeySet,
};
use crate::error::SampleError;
use crate::host::{DriverBinding, ResolvedAction, ShapeKeyHost};
use crate::ids::{ObjectId, SlotId};

/// A scene object carrying (optionally) shape keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneObject {
    pub shape_keys: Option<ShapeKeySet>,
    /// Name of the action assigned to the shape keys' animation data.
    pub action: Option<String>,
    pub drivers: Vec<ShapeKeyDriver>,
    /// Static custom property values, read by drivers when not animated.
    pub properties: HashMap<String, f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub objects: HashMap<ObjectId, SceneObject>,
    pub actions: Vec<Action>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, id: impl Into<String>, object: SceneObject) -> Self {
        self.objects.insert(ObjectId::new(id), object);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn object(&self, id: &ObjectId) -> Result<&SceneObject, SampleError> {
        self.objects
            .get(id)
            .ok_or_else(|| SampleError::UnknownObject(id.clone()))
    }

    fn property_value(
        object: &SceneObject,
        slot: Option<&ActionSlot>,
        property: &str,
        frame: f32,
    ) -> f32 {
        let path = custom_property_data_path(property);
        match slot.and_then(|s| s.fcurve(&path)) {
            Some(curve) => curve.evaluate(frame),
            None => object.properties.get(property).copied().unwrap_or(0.0),
        }
    }
}

impl ShapeKeyHost for Scene {
    fn shape_keys(&self, object: &ObjectId) -> Result<&ShapeKeySet, SampleError> {
        self.object(object)?
            .shape_keys
            .as_ref()
            .ok_or_else(|| SampleError::NoShapeKeys(object.clone()))
    }

    fn driver(&self, object: &ObjectId) -> DriverBinding<'_> {
        match self.objects.get(object) {
            Some(obj) if !obj.drivers.is_empty() => DriverBinding::CustomProperty(&obj.drivers),
            _ => DriverBinding::None,
        }
    }

    fn resolved_action(&self, object: &ObjectId, action_name: Option<&str>) -> ResolvedAction<'_> {
        if let Some(action) = action_name.and_then(|name| self.action(name)) {
            return ResolvedAction::Named(action);
        }
        match self
            .objects
            .get(object)
            .and_then(|obj| obj.action.as_deref())
            .and_then(|name| self.action(name))
        {
            Some(action) => ResolvedAction::Assigned(action),
            None => ResolvedAction::None,
        }
    }

    fn evaluate_shape_keys(
        &self,
        object: &ObjectId,
        action_name: Option<&str>,
        slot: Option<&SlotId>,
        frame: f32,
    ) -> Result<Vec<f32>, SampleError> {
        let obj = self.object(object)?;
        let keys = self.shape_keys(object)?;
        let action = self.resolved_action(object, action_name).action();
        let slot = match (action, slot) {
            (Some(action), Some(id)) => {
                Some(action.slot(id).ok_or_else(|| SampleError::UnknownSlot {
                    action: action.name.clone(),
                    slot: id.clone(),
                })?)
            }
            (Some(action), None) => action.slots.first(),
            (None, _) => None,
        };

        let values = keys
            .exported()
            .map(|block| {
                let driver = obj.drivers.iter().find(|d| d.shape_key == block.name);
                let raw = match driver {
                    Some(d) => d.apply(Self::property_value(obj, slot, &d.property, frame)),
                    None => slot
                        .and_then(|s| s.fcurve(&shape_key_data_path(&block.name)))
                        .map(|c| c.evaluate(frame))
                        .unwrap_or(block.value),
                };
                block.clamp(raw)
            })
            .collect();
        Ok(values)
    }
}
