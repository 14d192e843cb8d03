//! morphsample-core (host-agnostic)
//!
//! Samples shape-key (morph target) weights frame by frame for glTF export.
//! The host scene is reached through [`ShapeKeyHost`]; [`Scene`] is an
//! in-memory implementation. [`ExportSession`] memoizes results for one export.

pub mod channels;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod host;
pub mod ids;
pub mod keyframe;
pub mod optimize;
pub mod sampler;
pub mod sampling_cache;
pub mod scene;
pub mod session;

// Re-exports for consumers (adapters)
pub use channels::{resolve_channel_group, ChannelGroup};
pub use config::{ExportSettings, FrameRange, FrameRanges, NegativeFrames};
pub use curve::{CurveKey, Extrapolation, FCurve, Interpolation};
pub use data::{Action, ActionSlot, ShapeKeyBlock, ShapeKeyDriver, ShapeKeySet};
pub use error::SampleError;
pub use host::{DriverBinding, ResolvedAction, ShapeKeyHost};
pub use ids::{ObjectId, SlotId};
pub use keyframe::{complete_key, export_keyframes_json, Keyframe, NonKeyedValues};
pub use optimize::{collapse_constant, is_constant, CONSTANT_TOLERANCE};
pub use sampler::{collect, SamplingStrategy};
pub use sampling_cache::{CacheKey, SampleCache};
pub use scene::{Scene, SceneObject};
pub use session::{Collected, ExportSession};
