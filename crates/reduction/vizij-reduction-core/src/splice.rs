//! Write reduced keys back into host curve storage.

use crate::config::Interval;
use crate::curve::{CurvePoint, InterpCurve};
use crate::error::ReduceError;

/// Replace every key of `dest` inside `interval` (inclusive) with `reduced`.
///
/// Only the `[offset, offset + count)` slice of the reduced values and
/// tangents is copied, so one multi-dimensional reduction can feed several
/// destination curves. Keys outside the interval are kept in place.
pub fn splice(
    dest: &mut InterpCurve,
    reduced: &InterpCurve,
    interval: Interval,
    offset: usize,
    count: usize,
) -> Result<(), ReduceError> {
    let available = reduced.dim();
    if !reduced.is_empty() && offset + count > available {
        return Err(ReduceError::DimensionMismatch {
            offset,
            count,
            dim: available,
        });
    }
    if !dest.is_empty() && dest.dim() != count {
        return Err(ReduceError::DimensionMismatch {
            offset,
            count,
            dim: dest.dim(),
        });
    }

    let remove_start = dest.points.partition_point(|p| p.time < interval.start);
    let remove_end = dest
        .points
        .partition_point(|p| p.time <= interval.end)
        .max(remove_start);

    let replacement = reduced.points.iter().map(|key| CurvePoint {
        time: key.time,
        value: key.value.slice(offset, count),
        arrive_tangent: key.arrive_tangent.slice(offset, count),
        leave_tangent: key.leave_tangent.slice(offset, count),
        mode: key.mode,
    });
    let removed = dest.points.splice(remove_start..remove_end, replacement).count();

    log::trace!(
        "spliced {} keys over {removed} in [{}, {}]",
        reduced.len(),
        interval.start,
        interval.end
    );
    Ok(())
}
