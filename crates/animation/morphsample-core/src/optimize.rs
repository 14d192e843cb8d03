//! Constant-run detection for sampled shape-key sequences.

use crate::keyframe::Keyframe;

/// Absolute peak-to-peak tolerance under which a channel counts as constant.
pub const CONSTANT_TOLERANCE: f32 = 0.0001;

/// True when every channel's peak-to-peak range across `keyframes` is below
/// [`CONSTANT_TOLERANCE`]. Channels are taken from the first keyframe; a
/// channel holding NaN is never constant.
pub fn is_constant(keyframes: &[Keyframe]) -> bool {
    let Some(first) = keyframes.first() else {
        return true;
    };
    (0..first.value().len()).all(|i| {
        if keyframes.iter().any(|k| k.value()[i].is_nan()) {
            return false;
        }
        let (lo, hi) = keyframes
            .iter()
            .map(|k| k.value()[i])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        hi - lo < CONSTANT_TOLERANCE
    })
}

/// Keep only the first and last keyframe of a constant sequence of at least
/// two frames; anything else is returned unchanged.
pub fn collapse_constant(mut keyframes: Vec<Keyframe>) -> Vec<Keyframe> {
    if keyframes.len() < 2 || !is_constant(&keyframes) {
        return keyframes;
    }
    let last = keyframes.pop();
    keyframes.truncate(1);
    keyframes.extend(last);
    keyframes
}
