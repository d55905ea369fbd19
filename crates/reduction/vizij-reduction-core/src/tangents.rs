//! Hermite tangent recalculation for reduced keys.

use crate::channels::Channels;
use crate::curve::{CurvePoint, InterpMode};
use crate::error::ReduceError;
use crate::extract::ControlPoint;
use crate::locate::find_by_time;

/// Recompute arrive/leave tangents of `keys[index]` from its neighbours.
///
/// Ordinary keys and both curve ends get an auto tangent per dimension:
/// flat at a local extremum, otherwise the central-difference slope.
/// Interior `CurveBreak` keys keep a corner on every dimension whose source
/// tangents were broken; there arrive and leave are the raw value deltas to
/// the neighbours (not divided by the time delta).
pub fn recalculate_tangents(
    keys: &mut [CurvePoint],
    index: usize,
    control_points: &[ControlPoint],
) -> Result<(), ReduceError> {
    let Some(last) = keys.len().checked_sub(1) else {
        return Ok(());
    };
    let prev = &keys[index.saturating_sub(1)];
    let cur = &keys[index];
    let next = &keys[(index + 1).min(last)];

    let smoothness = if cur.mode == InterpMode::CurveBreak && index != 0 && index != last {
        let cp = find_by_time(control_points, cur.time)
            .ok_or(ReduceError::MissingControlPoint { time: cur.time })?;
        Some(&control_points[cp].smoothness)
    } else {
        None
    };

    let dim = cur.value.dim();
    let mut arrive = Channels::zeros(dim);
    let mut leave = Channels::zeros(dim);
    for d in 0..dim {
        let smooth = smoothness.map_or(true, |s| s.get(d).copied().unwrap_or(true));
        if smooth {
            let slope = auto_slope(prev, cur, next, d);
            arrive[d] = slope;
            leave[d] = slope;
        } else {
            arrive[d] = cur.value[d] - prev.value[d];
            leave[d] = next.value[d] - cur.value[d];
        }
    }

    let key = &mut keys[index];
    key.arrive_tangent = arrive;
    key.leave_tangent = leave;
    Ok(())
}

fn auto_slope(prev: &CurvePoint, cur: &CurvePoint, next: &CurvePoint, d: usize) -> f32 {
    let (p, c, n) = (prev.value[d], cur.value[d], next.value[d]);
    let local_max = c >= n && c >= p;
    let local_min = c <= n && c <= p;
    if local_max || local_min {
        0.0
    } else {
        (n - p) / (next.time - prev.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: f32, value: &[f32], mode: InterpMode) -> CurvePoint {
        CurvePoint::new(time, Channels::from_slice(value)).with_mode(mode)
    }

    fn corner(time: f32, smoothness: &[bool]) -> ControlPoint {
        ControlPoint {
            time,
            output: Channels::zeros(smoothness.len()),
            mode: InterpMode::CurveBreak,
            smoothness: smoothness.iter().copied().collect(),
        }
    }

    #[test]
    fn monotonic_key_gets_central_difference() {
        let mut keys = vec![
            key(0.0, &[0.0], InterpMode::CurveUser),
            key(1.0, &[1.0], InterpMode::CurveUser),
            key(3.0, &[5.0], InterpMode::CurveUser),
        ];
        recalculate_tangents(&mut keys, 1, &[]).unwrap();
        assert_eq!(keys[1].arrive_tangent[0], 5.0 / 3.0);
        assert_eq!(keys[1].leave_tangent[0], 5.0 / 3.0);
    }

    #[test]
    fn extrema_and_endpoints_are_flat() {
        let mut keys = vec![
            key(0.0, &[0.0, 1.0], InterpMode::CurveUser),
            key(1.0, &[2.0, 0.5], InterpMode::CurveUser),
            key(2.0, &[1.0, 0.0], InterpMode::CurveUser),
        ];
        for i in 0..keys.len() {
            recalculate_tangents(&mut keys, i, &[]).unwrap();
        }
        // dim 0 peaks in the middle, dim 1 falls straight through it.
        assert_eq!(keys[1].arrive_tangent.as_slice(), &[0.0, -0.5]);
        assert_eq!(keys[0].leave_tangent.as_slice(), &[0.0, 0.0]);
        assert_eq!(keys[2].arrive_tangent.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn broken_dimension_keeps_raw_deltas() {
        let mut keys = vec![
            key(0.0, &[0.0, 0.0], InterpMode::CurveUser),
            key(2.0, &[1.0, 1.0], InterpMode::CurveBreak),
            key(4.0, &[4.0, 4.0], InterpMode::CurveUser),
        ];
        let cps = vec![corner(2.0, &[true, false])];
        recalculate_tangents(&mut keys, 1, &cps).unwrap();
        assert_eq!(keys[1].arrive_tangent.as_slice(), &[1.0, 1.0]);
        assert_eq!(keys[1].leave_tangent.as_slice(), &[1.0, 3.0]);
    }

    #[test]
    fn broken_key_without_control_point_is_an_error() {
        let mut keys = vec![
            key(0.0, &[0.0], InterpMode::CurveUser),
            key(1.0, &[1.0], InterpMode::CurveBreak),
            key(2.0, &[3.0], InterpMode::CurveUser),
        ];
        assert_eq!(
            recalculate_tangents(&mut keys, 1, &[]),
            Err(ReduceError::MissingControlPoint { time: 1.0 })
        );
    }
}
