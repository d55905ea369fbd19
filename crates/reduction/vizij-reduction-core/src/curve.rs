//! Hermite curve storage and evaluation.
//!
//! Model:
//! - An [`InterpCurve`] is an ordered list of [`CurvePoint`]s sharing one
//!   dimension count.
//! - Segment `[k -> k+1]` is interpolated according to `k.mode`:
//!   Constant holds `k.value`, Linear blends values, every curve mode uses a
//!   cubic Hermite with `k.leave_tangent` and `(k+1).arrive_tangent` scaled by
//!   the segment duration.
//! - Evaluation clamps to the first/last value outside the key range.

use serde::{Deserialize, Serialize};

use crate::channels::Channels;
use crate::error::ReduceError;
use crate::locate::Timed;

/// Interpolation mode of the segment leaving a key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMode {
    #[default]
    Linear,
    Constant,
    CurveAuto,
    CurveAutoClamped,
    CurveUser,
    /// Hermite key with independent arrive/leave tangents.
    CurveBreak,
}

impl InterpMode {
    /// Smooth keys may be removed by a reduction; everything else is locked.
    #[inline]
    pub fn is_smooth(self) -> bool {
        matches!(
            self,
            InterpMode::Linear
                | InterpMode::CurveAuto
                | InterpMode::CurveAutoClamped
                | InterpMode::CurveUser
        )
    }
}

/// A single key: time, value and Hermite tangents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f32,
    pub value: Channels,
    #[serde(default)]
    pub arrive_tangent: Channels,
    #[serde(default)]
    pub leave_tangent: Channels,
    #[serde(default)]
    pub mode: InterpMode,
}

impl CurvePoint {
    /// Linear key with zero tangents.
    pub fn new(time: f32, value: Channels) -> Self {
        let dim = value.dim();
        Self {
            time,
            value,
            arrive_tangent: Channels::zeros(dim),
            leave_tangent: Channels::zeros(dim),
            mode: InterpMode::Linear,
        }
    }

    /// One-dimensional Linear key.
    pub fn scalar(time: f32, value: f32) -> Self {
        Self::new(time, Channels::from_slice(&[value]))
    }

    pub fn with_mode(mut self, mode: InterpMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tangents(mut self, arrive: Channels, leave: Channels) -> Self {
        self.arrive_tangent = arrive;
        self.leave_tangent = leave;
        self
    }
}

impl Timed for CurvePoint {
    #[inline]
    fn time(&self) -> f32 {
        self.time
    }
}

/// Ordered key storage with Hermite evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterpCurve {
    pub points: Vec<CurvePoint>,
}

impl InterpCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension count of the keys (0 for an empty curve).
    pub fn dim(&self) -> usize {
        self.points.first().map_or(0, |p| p.value.dim())
    }

    /// Time of the first and last key.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.points.first()?.time, self.points.last()?.time))
    }

    /// Insert a Linear key with zero tangents before the first key whose time
    /// is not smaller, returning its index.
    pub fn add_point(&mut self, time: f32, value: Channels) -> usize {
        let index = self.points.partition_point(|p| p.time < time);
        self.points.insert(index, CurvePoint::new(time, value));
        index
    }

    /// Evaluate every dimension at `time`; `None` for an empty curve.
    pub fn eval(&self, time: f32) -> Option<Channels> {
        let first = self.points.first()?;
        if self.points.len() < 2 || time <= first.time {
            return Some(first.value.clone());
        }
        let last = &self.points[self.points.len() - 1];
        if time >= last.time {
            return Some(last.value.clone());
        }

        // first <= time < last, so `next` lands in 1..len
        let next = self.points.partition_point(|p| p.time <= time);
        let k0 = &self.points[next - 1];
        let k1 = &self.points[next];
        let dt = k1.time - k0.time;
        if dt <= 0.0 || k0.mode == InterpMode::Constant {
            return Some(k0.value.clone());
        }
        let alpha = (time - k0.time) / dt;
        let value = match k0.mode {
            InterpMode::Linear => k0
                .value
                .iter()
                .zip(k1.value.iter())
                .map(|(a, b)| a + (b - a) * alpha)
                .collect(),
            _ => (0..k0.value.dim())
                .map(|d| {
                    cubic_interp(
                        k0.value[d],
                        k0.leave_tangent[d] * dt,
                        k1.value[d],
                        k1.arrive_tangent[d] * dt,
                        alpha,
                    )
                })
                .collect(),
        };
        Some(value)
    }

    /// Give zero tangents to keys that were stored without them.
    pub fn fill_missing_tangents(&mut self) {
        for p in &mut self.points {
            let dim = p.value.dim();
            if p.arrive_tangent.is_empty() {
                p.arrive_tangent = Channels::zeros(dim);
            }
            if p.leave_tangent.is_empty() {
                p.leave_tangent = Channels::zeros(dim);
            }
        }
    }

    /// Check ordering and channel counts.
    pub fn validate(&self) -> Result<(), ReduceError> {
        let dim = self.dim();
        let mut last = f32::NEG_INFINITY;
        for (index, p) in self.points.iter().enumerate() {
            if !p.time.is_finite() || p.time < last {
                return Err(ReduceError::UnsortedKeys {
                    index,
                    time: p.time,
                });
            }
            last = p.time;
            for found in [p.value.dim(), p.arrive_tangent.dim(), p.leave_tangent.dim()] {
                if found != dim {
                    return Err(ReduceError::ChannelCount {
                        index,
                        expected: dim,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Cubic Hermite: H(a) = h00 p0 + h10 m0 + h01 p1 + h11 m1
#[inline]
pub fn cubic_interp(p0: f32, m0: f32, p1: f32, m1: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let a3 = a2 * alpha;
    (2.0 * a3 - 3.0 * a2 + 1.0) * p0
        + (a3 - 2.0 * a2 + alpha) * m0
        + (a3 - a2) * m1
        + (-2.0 * a3 + 3.0 * a2) * p1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn scalar(curve: &InterpCurve, t: f32) -> f32 {
        curve.eval(t).expect("non-empty curve")[0]
    }

    #[test]
    fn eval_clamps_outside_key_range() {
        let curve = InterpCurve::from_points(vec![
            CurvePoint::scalar(1.0, 2.0),
            CurvePoint::scalar(2.0, 4.0),
        ]);
        approx(scalar(&curve, 0.0), 2.0, 1e-6);
        approx(scalar(&curve, 5.0), 4.0, 1e-6);
        assert!(InterpCurve::new().eval(0.0).is_none());
    }

    #[test]
    fn eval_respects_segment_modes() {
        let curve = InterpCurve::from_points(vec![
            CurvePoint::scalar(0.0, 0.0),
            CurvePoint::scalar(1.0, 1.0).with_mode(InterpMode::Constant),
            CurvePoint::scalar(2.0, 3.0).with_mode(InterpMode::CurveUser),
            CurvePoint::scalar(3.0, 3.0),
        ]);
        approx(scalar(&curve, 0.25), 0.25, 1e-6);
        approx(scalar(&curve, 1.75), 1.0, 1e-6);
        // Hermite with zero tangents is a smoothstep between equal values.
        approx(scalar(&curve, 2.5), 3.0, 1e-6);
    }

    #[test]
    fn hermite_uses_tangents_scaled_by_segment_length() {
        // p(t) = t over [0, 2] with unit slopes reproduces the line exactly.
        let curve = InterpCurve::from_points(vec![
            CurvePoint::scalar(0.0, 0.0)
                .with_mode(InterpMode::CurveAuto)
                .with_tangents(Channels::from_slice(&[1.0]), Channels::from_slice(&[1.0])),
            CurvePoint::scalar(2.0, 2.0).with_tangents(Channels::from_slice(&[1.0]), Channels::from_slice(&[1.0])),
        ]);
        for t in [0.2_f32, 0.7, 1.0, 1.6] {
            approx(scalar(&curve, t), t, 1e-5);
        }
    }

    #[test]
    fn add_point_inserts_before_equal_times() {
        let mut curve = InterpCurve::from_points(vec![
            CurvePoint::scalar(0.0, 0.0),
            CurvePoint::scalar(1.0, 1.0),
        ]);
        assert_eq!(curve.add_point(0.5, Channels::from_slice(&[9.0])), 1);
        assert_eq!(curve.add_point(1.0, Channels::from_slice(&[8.0])), 2);
        assert_eq!(curve.add_point(4.0, Channels::from_slice(&[7.0])), 4);
        let times: Vec<f32> = curve.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn validate_rejects_unsorted_and_ragged_keys() {
        let unsorted = InterpCurve::from_points(vec![
            CurvePoint::scalar(1.0, 0.0),
            CurvePoint::scalar(0.5, 0.0),
        ]);
        assert_eq!(
            unsorted.validate(),
            Err(ReduceError::UnsortedKeys {
                index: 1,
                time: 0.5
            })
        );

        let ragged = InterpCurve::from_points(vec![
            CurvePoint::new(0.0, Channels::from_slice(&[0.0, 1.0])),
            CurvePoint::scalar(1.0, 0.0),
        ]);
        assert!(matches!(
            ragged.validate(),
            Err(ReduceError::ChannelCount { index: 1, .. })
        ));
    }
}
