//! Export settings consumed by the shape-key sampler.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::SampleError;
use crate::ids::ObjectId;

/// Upper bound on frames sampled for one (object, action) pair.
pub const MAX_FRAME_COUNT: usize = 1 << 24;

/// Range key used when sampling without a named action (bake-only mode).
pub const BAKE_RANGE_KEY: &str = "";

/// Inclusive frame range authored for one (object, action) pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: f32,
    pub end: f32,
}

impl FrameRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Number of frames sampled from `start` to `end` inclusive at `step`.
    /// Empty (0) when `end < start`. No sampled frame lies past `end`.
    pub fn frame_count(&self, step: f32) -> Result<usize, SampleError> {
        if self.end < self.start {
            return Ok(0);
        }
        // Tolerate float noise from fractional steps (e.g. 0.1).
        let span = f64::from(self.end) - f64::from(self.start);
        let steps = (span / f64::from(step) + 1e-4).floor();
        if !steps.is_finite() || steps >= MAX_FRAME_COUNT as f64 {
            return Err(SampleError::TooManyFrames {
                start: self.start,
                end: self.end,
                step,
            });
        }
        let mut count = steps as usize + 1;
        let limit = self.end + f32::EPSILON * self.end.abs().max(1.0);
        while count > 0 && self.frame_at(count - 1, step) > limit {
            count -= 1;
        }
        Ok(count)
    }

    /// Frame time of sample `i`. Computed from `start` to avoid accumulated drift.
    #[inline]
    pub fn frame_at(&self, i: usize, step: f32) -> f32 {
        self.start + i as f32 * step
    }
}

/// How frames before 0 are treated when resolving a range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeFrames {
    /// Keep the authored range; the serializer shifts times later.
    #[default]
    Slide,
    /// Drop every frame below 0.
    Crop,
}

/// Frame ranges per object, then per action name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRanges(HashMap<ObjectId, HashMap<String, FrameRange>>);

impl FrameRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the range for `object` and `action` (`None` = bake range).
    pub fn insert(&mut self, object: ObjectId, action: Option<&str>, range: FrameRange) {
        self.0
            .entry(object)
            .or_default()
            .insert(action.unwrap_or(BAKE_RANGE_KEY).to_string(), range);
    }

    pub fn get(&self, object: &ObjectId, action: Option<&str>) -> Option<FrameRange> {
        self.0
            .get(object)
            .and_then(|per_action| per_action.get(action.unwrap_or(BAKE_RANGE_KEY)))
            .copied()
    }
}

/// Settings bundle for one export session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Frame ranges per (object, action).
    pub ranges: FrameRanges,
    /// Sampling step in frames.
    pub frame_step: f32,
    /// When set, shape keys are evaluated from their curves instead of
    /// baking the whole scene frame by frame.
    pub disable_viewport_optimization: bool,
    /// Collapse constant sequences to their first and last keyframe.
    pub optimize_animation: bool,
    pub negative_frames: NegativeFrames,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ranges: FrameRanges::new(),
            frame_step: 1.0,
            disable_viewport_optimization: false,
            optimize_animation: true,
            negative_frames: NegativeFrames::Slide,
        }
    }
}

impl ExportSettings {
    /// Validated sampling step.
    pub fn step(&self) -> Result<f32, SampleError> {
        if self.frame_step.is_finite() && self.frame_step > 0.0 {
            Ok(self.frame_step)
        } else {
            Err(SampleError::InvalidStep(self.frame_step))
        }
    }

    /// Resolve the effective frame range for `object`/`action`, applying the
    /// negative-frame policy. A cropped range may come back empty (`end < start`).
    pub fn resolve_range(
        &self,
        object: &ObjectId,
        action: Option<&str>,
    ) -> Result<FrameRange, SampleError> {
        let mut range =
            self.ranges
                .get(object, action)
                .ok_or_else(|| SampleError::MissingRange {
                    object: object.clone(),
                    action: action.unwrap_or(BAKE_RANGE_KEY).to_string(),
                })?;
        if self.negative_frames == NegativeFrames::Crop {
            range.start = range.start.max(0.0);
        }
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_is_inclusive() {
        assert_eq!(FrameRange::new(1.0, 10.0).frame_count(1.0), Ok(10));
        assert_eq!(FrameRange::new(0.0, 10.0).frame_count(3.0), Ok(4));
        assert_eq!(FrameRange::new(0.0, 1.0).frame_count(0.1), Ok(11));
        assert_eq!(FrameRange::new(5.0, 5.0).frame_count(2.0), Ok(1));
        assert_eq!(FrameRange::new(5.0, 4.0).frame_count(1.0), Ok(0));
    }

    #[test]
    fn frame_count_never_passes_a_fractional_end() {
        let range = FrameRange::new(0.0, 2.99995);
        assert_eq!(range.frame_count(1.0), Ok(3));
        let range = FrameRange::new(1.0, 4.5);
        assert_eq!(range.frame_count(0.5), Ok(8));
    }

    #[test]
    fn frame_count_rejects_runaway_ranges() {
        let err = FrameRange::new(0.0, 1.0e10).frame_count(1.0e-30).unwrap_err();
        assert!(matches!(err, SampleError::TooManyFrames { .. }));
        assert!(FrameRange::new(0.0, f32::MAX).frame_count(1.0).is_err());
    }

    #[test]
    fn crop_clamps_start_and_can_empty_the_range() {
        let obj = ObjectId::from("Face");
        let mut settings = ExportSettings {
            negative_frames: NegativeFrames::Crop,
            ..Default::default()
        };
        settings
            .ranges
            .insert(obj.clone(), Some("Smile"), FrameRange::new(-10.0, 5.0));
        settings
            .ranges
            .insert(obj.clone(), None, FrameRange::new(-10.0, -2.0));

        let r = settings.resolve_range(&obj, Some("Smile")).unwrap();
        assert_eq!(r, FrameRange::new(0.0, 5.0));
        let baked = settings.resolve_range(&obj, None).unwrap();
        assert_eq!(baked.frame_count(1.0), Ok(0));
    }

    #[test]
    fn missing_range_and_bad_step_are_errors() {
        let settings = ExportSettings {
            frame_step: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.step(), Err(SampleError::InvalidStep(0.0)));
        let err = settings
            .resolve_range(&ObjectId::from("Nope"), Some("A"))
            .unwrap_err();
        assert!(matches!(err, SampleError::MissingRange { .. }));
    }

    #[test]
    fn settings_parse_with_defaults() {
        let json = r#"{
            "ranges": { "Face": { "Smile": { "start": 1, "end": 24 } } },
            "negative_frames": "crop"
        }"#;
        let settings: ExportSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.frame_step, 1.0);
        assert!(settings.optimize_animation);
        assert!(!settings.disable_viewport_optimization);
        assert_eq!(settings.negative_frames, NegativeFrames::Crop);
        assert_eq!(
            settings.ranges.get(&ObjectId::from("Face"), Some("Smile")),
            Some(FrameRange::new(1.0, 24.0))
        );
    }
}
