//! Errors raised while collecting shape-key samples.
//!
//! "No data" outcomes (empty range, basis-only shape keys) are not errors;
//! they surface as `Ok(None)` from the collectors.

use thiserror::Error;

use crate::ids::{ObjectId, SlotId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("unknown object '{0}'")]
    UnknownObject(ObjectId),
    #[error("object '{0}' has no shape keys")]
    NoShapeKeys(ObjectId),
    #[error("no frame range for object '{object}' and action '{action}'")]
    MissingRange { object: ObjectId, action: String },
    #[error("action '{action}' has no slot '{slot}'")]
    UnknownSlot { action: String, slot: SlotId },
    #[error("frame step must be finite and > 0 (got {0})")]
    InvalidStep(f32),
    #[error("frame range {start}..{end} at step {step} yields too many frames")]
    TooManyFrames { start: f32, end: f32, step: f32 },
    #[error("no baked sample for object '{object}' at frame {frame}")]
    CacheMiss { object: ObjectId, frame: f32 },
}
