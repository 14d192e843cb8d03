//! Animation curves (f-curves) and their evaluation at arbitrary frames.
//!
//! Model:
//! - A curve holds keys ordered by frame, each with an interpolation mode
//!   that governs the segment leaving that key.
//! - Bezier segments are 2D cubics through
//!   (left, left.handle_right, right.handle_left, right); x is solved for the
//!   requested frame by bisection, then y is returned.
//! - Outside the keyed range the curve's extrapolation applies.

use serde::{Deserialize, Serialize};

/// Bisection iterations used to invert the bezier x polynomial.
const BEZIER_ITERATIONS: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    #[default]
    Constant,
    Linear,
}

/// A single curve key: `(frame, value)` plus bezier handles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub frame: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Incoming handle `[frame, value]`; defaults to one third along the segment.
    #[serde(default)]
    pub handle_left: Option<[f32; 2]>,
    /// Outgoing handle `[frame, value]`; defaults to one third along the segment.
    #[serde(default)]
    pub handle_right: Option<[f32; 2]>,
}

impl CurveKey {
    pub fn new(frame: f32, value: f32, interpolation: Interpolation) -> Self {
        Self {
            frame,
            value,
            interpolation,
            handle_left: None,
            handle_right: None,
        }
    }
}

/// An animation curve bound to a data path (e.g. `key_blocks["Smile"].value`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: usize,
    pub keys: Vec<CurveKey>,
    #[serde(default)]
    pub extrapolation: Extrapolation,
}

impl FCurve {
    pub fn new(data_path: impl Into<String>, keys: Vec<CurveKey>) -> Self {
        Self {
            data_path: data_path.into(),
            array_index: 0,
            keys,
            extrapolation: Extrapolation::Constant,
        }
    }

    /// Evaluate the curve at `frame`.
    pub fn evaluate(&self, frame: f32) -> f32 {
        let keys = &self.keys;
        let n = keys.len();
        match n {
            0 => 0.0,
            1 => keys[0].value,
            _ => {
                let first = &keys[0];
                let last = &keys[n - 1];
                if frame <= first.frame {
                    return self.extrapolate(first, &keys[1], frame);
                }
                if frame >= last.frame {
                    return self.extrapolate(last, &keys[n - 2], frame);
                }
                let i = find_segment(keys, frame);
                evaluate_segment(&keys[i], &keys[i + 1], frame)
            }
        }
    }

    fn extrapolate(&self, end: &CurveKey, neighbour: &CurveKey, frame: f32) -> f32 {
        match self.extrapolation {
            Extrapolation::Constant => end.value,
            Extrapolation::Linear => {
                let df = neighbour.frame - end.frame;
                if df.abs() <= f32::EPSILON {
                    return end.value;
                }
                let slope = (neighbour.value - end.value) / df;
                end.value + slope * (frame - end.frame)
            }
        }
    }
}

/// Index `i` of the segment `[keys[i], keys[i+1]]` containing `frame`.
/// Callers guarantee `keys[0].frame < frame < keys[last].frame`.
fn find_segment(keys: &[CurveKey], frame: f32) -> usize {
    // First key strictly after `frame`, minus one.
    let upper = keys.partition_point(|k| k.frame <= frame);
    upper.saturating_sub(1).min(keys.len() - 2)
}

fn evaluate_segment(left: &CurveKey, right: &CurveKey, frame: f32) -> f32 {
    let span = right.frame - left.frame;
    if span <= f32::EPSILON {
        return right.value;
    }
    match left.interpolation {
        Interpolation::Constant => left.value,
        Interpolation::Linear => {
            let t = (frame - left.frame) / span;
            left.value + (right.value - left.value) * t
        }
        Interpolation::Bezier => {
            let third = span / 3.0;
            let dv = right.value - left.value;
            let h1 = left
                .handle_right
                .unwrap_or([left.frame + third, left.value + dv / 3.0]);
            let h2 = right
                .handle_left
                .unwrap_or([right.frame - third, right.value - dv / 3.0]);
            // Keep handles inside the segment so x stays monotonic.
            let x1 = h1[0].clamp(left.frame, right.frame);
            let x2 = h2[0].clamp(left.frame, right.frame);
            let t = solve_bezier_x(left.frame, x1, x2, right.frame, frame);
            cubic_bezier(left.value, h1[1], h2[1], right.value, t)
        }
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Find `t` in [0,1] with `cubic_bezier(x0, x1, x2, x3, t) == x` by bisection.
fn solve_bezier_x(x0: f32, x1: f32, x2: f32, x3: f32, x: f32) -> f32 {
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = ((x - x0) / (x3 - x0)).clamp(0.0, 1.0);
    for _ in 0..BEZIER_ITERATIONS {
        let bx = cubic_bezier(x0, x1, x2, x3, mid);
        if (bx - x).abs() < 1e-6 {
            break;
        }
        if bx < x {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    mid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    fn curve(interp: Interpolation, keys: &[(f32, f32)]) -> FCurve {
        FCurve::new(
            "key_blocks[\"A\"].value",
            keys.iter()
                .map(|&(f, v)| CurveKey::new(f, v, interp))
                .collect(),
        )
    }

    #[test]
    fn empty_and_single_key() {
        approx(curve(Interpolation::Linear, &[]).evaluate(3.0), 0.0);
        approx(curve(Interpolation::Linear, &[(2.0, 0.7)]).evaluate(-5.0), 0.7);
    }

    #[test]
    fn linear_and_constant_segments() {
        let lin = curve(Interpolation::Linear, &[(0.0, 0.0), (10.0, 1.0), (20.0, 0.0)]);
        approx(lin.evaluate(5.0), 0.5);
        approx(lin.evaluate(10.0), 1.0);
        approx(lin.evaluate(15.0), 0.5);

        let step = curve(Interpolation::Constant, &[(0.0, 0.2), (10.0, 0.9)]);
        approx(step.evaluate(9.9), 0.2);
        approx(step.evaluate(10.0), 0.9);
    }

    #[test]
    fn default_handles_make_bezier_linear() {
        let c = curve(Interpolation::Bezier, &[(0.0, 0.0), (10.0, 1.0)]);
        for f in [1.0, 2.5, 5.0, 7.5, 9.0] {
            approx(c.evaluate(f), f / 10.0);
        }
    }

    #[test]
    fn eased_bezier_is_symmetric() {
        let mut c = curve(Interpolation::Bezier, &[(0.0, 0.0), (10.0, 1.0)]);
        c.keys[0].handle_right = Some([4.0, 0.0]);
        c.keys[1].handle_left = Some([6.0, 1.0]);
        approx(c.evaluate(5.0), 0.5);
        assert!(c.evaluate(2.0) < 0.2);
        assert!(c.evaluate(8.0) > 0.8);
    }

    #[test]
    fn extrapolation_modes() {
        let mut c = curve(Interpolation::Linear, &[(0.0, 0.0), (10.0, 1.0)]);
        approx(c.evaluate(-10.0), 0.0);
        approx(c.evaluate(20.0), 1.0);
        c.extrapolation = Extrapolation::Linear;
        approx(c.evaluate(-10.0), -1.0);
        approx(c.evaluate(20.0), 2.0);
    }
}
