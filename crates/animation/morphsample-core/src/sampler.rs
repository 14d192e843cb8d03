//! Shape-key sample collector.
//!
//! Three strategies produce the per-frame weight vectors:
//! - `Evaluate`: read the shape-key curves directly and gap-fill unanimated
//!   keys from their current values (viewport optimization disabled, no driver).
//! - `DriverBake`: shape keys are driven by custom properties, so values come
//!   from the bake cache (viewport optimization disabled).
//! - `FullBake`: always use the bake cache (viewport optimization enabled).
//!
//! The strategy is picked once per call; every frame then goes through
//! [`SamplingStrategy::sample_frame`].

use log::debug;

use crate::channels::{resolve_channel_group, ChannelGroup};
use crate::config::ExportSettings;
use crate::error::SampleError;
use crate::host::ShapeKeyHost;
use crate::ids::{ObjectId, SlotId};
use crate::keyframe::{complete_key, Keyframe, NonKeyedValues};
use crate::optimize::collapse_constant;
use crate::sampling_cache::{CacheKey, SampleCache};

/// One sampling request: what to sample and at which step.
#[derive(Clone, Copy, Debug)]
pub struct SampleRequest<'a> {
    pub object: &'a ObjectId,
    pub action: Option<&'a str>,
    pub slot: Option<&'a SlotId>,
    pub step: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SamplingStrategy<'h> {
    Evaluate {
        channels: ChannelGroup<'h>,
        non_keyed: NonKeyedValues,
    },
    DriverBake,
    FullBake,
}

impl<'h> SamplingStrategy<'h> {
    /// Pick the strategy for `object` from the settings and the host's data.
    pub fn select<H: ShapeKeyHost>(
        host: &'h H,
        settings: &ExportSettings,
        object: &ObjectId,
        action: Option<&str>,
        slot: Option<&SlotId>,
    ) -> Result<Self, SampleError> {
        let keys = host.shape_keys(object)?;
        if !settings.disable_viewport_optimization {
            return Ok(SamplingStrategy::FullBake);
        }
        if host.driver(object).is_driven() {
            return Ok(SamplingStrategy::DriverBake);
        }
        let channels = resolve_channel_group(host, object, action, slot)?;
        Ok(SamplingStrategy::Evaluate {
            channels,
            non_keyed: NonKeyedValues::from_shape_keys(keys),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SamplingStrategy::Evaluate { .. } => "evaluate",
            SamplingStrategy::DriverBake => "driver-bake",
            SamplingStrategy::FullBake => "full-bake",
        }
    }

    /// Produce the keyframe at `frame`.
    pub fn sample_frame<H: ShapeKeyHost>(
        &self,
        host: &H,
        settings: &ExportSettings,
        cache: &mut SampleCache,
        request: &SampleRequest<'_>,
        frame: f32,
    ) -> Result<Keyframe, SampleError> {
        match self {
            SamplingStrategy::Evaluate {
                channels,
                non_keyed,
            } => {
                let mut key = Keyframe::new(frame, channels.keyed_mask());
                key.set_keyed_values(channels.evaluate(frame));
                if channels.animated_count() != key.target_len() {
                    complete_key(&mut key, non_keyed);
                }
                Ok(key)
            }
            SamplingStrategy::DriverBake | SamplingStrategy::FullBake => {
                let cache_key = CacheKey::shape_keys(
                    request.object,
                    request.action,
                    frame,
                    request.step,
                    request.slot,
                );
                let value_total = cache.get_cache_data(host, settings, &cache_key)?;
                Ok(Keyframe::baked(frame, value_total))
            }
        }
    }
}

/// Sample the shape keys of `object` over its frame range.
///
/// Returns `Ok(None)` when there is nothing to export: the range is empty
/// (e.g. fully cropped) or the object only has a basis key.
pub fn collect<H: ShapeKeyHost>(
    host: &H,
    settings: &ExportSettings,
    cache: &mut SampleCache,
    object: &ObjectId,
    action: Option<&str>,
    slot: Option<&SlotId>,
) -> Result<Option<Vec<Keyframe>>, SampleError> {
    let range = settings.resolve_range(object, action)?;
    let step = settings.step()?;
    let strategy = SamplingStrategy::select(host, settings, object, action, slot)?;
    let count = range.frame_count(step)?;
    debug!(
        "sampling shape keys of '{}' (action {:?}, slot {:?}) with {}: {} frames",
        object,
        action,
        slot.map(SlotId::as_str),
        strategy.name(),
        count
    );

    let request = SampleRequest {
        object,
        action,
        slot,
        step,
    };
    let mut keyframes = Vec::with_capacity(count);
    for i in 0..count {
        let frame = range.frame_at(i, step);
        keyframes.push(strategy.sample_frame(host, settings, cache, &request, frame)?);
    }

    let result = finalize(keyframes, settings.optimize_animation);
    if result.is_none() {
        debug!("no shape-key animation to export for '{object}'");
    }
    Ok(result)
}

/// Reject empty or basis-only sequences, then collapse constant runs when
/// `optimize` is set.
pub fn finalize(keyframes: Vec<Keyframe>, optimize: bool) -> Option<Vec<Keyframe>> {
    if keyframes.is_empty() {
        return None;
    }
    if keyframes.iter().any(|k| k.value().is_empty()) {
        return None;
    }
    if !optimize {
        return Some(keyframes);
    }
    Some(collapse_constant(keyframes))
}
