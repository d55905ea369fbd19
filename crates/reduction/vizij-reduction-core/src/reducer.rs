//! Greedy, worst-point-first key reduction.
//!
//! The segment queue starts with every smooth run found by
//! [`ReductionState::extract`]. Each dequeued segment is checked against the
//! curve as currently reduced; the interior control point with the largest
//! time-weighted excess error becomes a new key and the two halves are
//! queued. A segment with no excess error is done.
//!
//! Adding a key recomputes its neighbours' tangents, which can move the curve
//! inside spans that were already accepted. Once the queue drains, every span
//! between adjacent keys is re-checked and offending spans are queued again,
//! so the result always honours the tolerance.

use std::collections::VecDeque;

use crate::channels::Channels;
use crate::config::Interval;
use crate::curve::{InterpCurve, InterpMode};
use crate::error::ReduceError;
use crate::extract::{ControlPoint, CurveGroup, MIN_TOLERANCE};
use crate::locate::find_by_time;
use crate::splice::splice;
use crate::tangents::recalculate_tangents;

/// Inclusive span of control point indices awaiting evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

/// Working state of a single reduction call.
#[derive(Debug)]
pub struct ReductionState {
    pub(crate) dim: usize,
    pub(crate) output: InterpCurve,
    pub(crate) control_points: Vec<ControlPoint>,
    pub(crate) segment_queue: VecDeque<Segment>,
    pub(crate) tolerance: Channels,
    pub(crate) relative_tolerance: f32,
    pub(crate) interval: Interval,
}

impl ReductionState {
    /// `interval` is used as given; callers pad it (see [`Interval::padded`]).
    pub fn new(dim: usize, interval: Interval, relative_tolerance: f32) -> Self {
        Self {
            dim,
            output: InterpCurve::new(),
            control_points: Vec::new(),
            segment_queue: VecDeque::new(),
            tolerance: Channels::splat(dim, MIN_TOLERANCE),
            relative_tolerance,
            interval,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn output(&self) -> &InterpCurve {
        &self.output
    }

    pub fn into_output(self) -> InterpCurve {
        self.output
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Absolute per-dimension tolerance.
    pub fn tolerance(&self) -> &Channels {
        &self.tolerance
    }

    pub fn pending_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.segment_queue.iter().copied()
    }

    /// Queue a span unless it has no interior control point.
    pub(crate) fn enqueue(&mut self, start: usize, end: usize) {
        if end >= start + 2 {
            self.segment_queue.push_back(Segment { start, end });
        }
    }

    /// Finalize the pre-placed keys and reduce every queued segment.
    pub fn reduce(&mut self) -> Result<(), ReduceError> {
        if self.control_points.is_empty() {
            return Err(ReduceError::NoControlPoints {
                start: self.interval.start,
                end: self.interval.end,
            });
        }

        for key in &mut self.output.points {
            let index = find_by_time(&self.control_points, key.time)
                .ok_or(ReduceError::MissingControlPoint { time: key.time })?;
            let cp = &self.control_points[index];
            key.value = cp.output.clone();
            key.mode = cp.mode;
        }
        // Tangents need every neighbour's final value, hence the second pass.
        for index in 0..self.output.len() {
            recalculate_tangents(&mut self.output.points, index, &self.control_points)?;
        }

        if self.control_points.len() == 1 {
            self.segment_queue.clear();
            return Ok(());
        }

        loop {
            while let Some(segment) = self.segment_queue.pop_front() {
                self.reduce_segment(segment)?;
            }
            if !self.requeue_violations()? {
                break;
            }
        }

        log::debug!(
            "reduced {} control points to {} keys",
            self.control_points.len(),
            self.output.len()
        );
        Ok(())
    }

    /// Promote the worst interior control point of `segment`, if any exceeds
    /// the tolerance, and queue both halves.
    ///
    /// A segment reaching past the control point list is an error.
    pub fn reduce_segment(&mut self, segment: Segment) -> Result<(), ReduceError> {
        let Segment { start, end } = segment;
        let len = self.control_points.len();
        if start > end || end >= len {
            return Err(ReduceError::SegmentOutOfRange { start, end, len });
        }
        if end < start + 2 {
            return Ok(());
        }

        let start_time = self.control_points[start].time;
        let end_time = self.control_points[end].time;
        let mut worst: Option<(usize, f32)> = None;
        for index in start + 1..end {
            let error = self.excess_error(index);
            if error > 0.0 {
                let time = self.control_points[index].time;
                // Favour points far from both ends of the span.
                let weighted = error * (time - start_time).min(end_time - time);
                if weighted > worst.map_or(0.0, |(_, w)| w) {
                    worst = Some((index, weighted));
                }
            }
        }
        let Some((index, weighted)) = worst else {
            return Ok(());
        };

        let cp = &self.control_points[index];
        log::trace!("promoting control point at {} (weighted error {weighted})", cp.time);
        let key = self.output.add_point(cp.time, cp.output.clone());
        self.output.points[key].mode = InterpMode::CurveUser;
        recalculate_tangents(&mut self.output.points, key, &self.control_points)?;
        if key > 0 {
            recalculate_tangents(&mut self.output.points, key - 1, &self.control_points)?;
        }
        if key + 1 < self.output.len() {
            recalculate_tangents(&mut self.output.points, key + 1, &self.control_points)?;
        }

        self.enqueue(start, index);
        self.enqueue(index, end);
        Ok(())
    }

    /// Root of the summed squared error beyond tolerance at one control point.
    fn excess_error(&self, index: usize) -> f32 {
        let cp = &self.control_points[index];
        let Some(evaluated) = self.output.eval(cp.time) else {
            return 0.0;
        };
        let mut sum = 0.0;
        for d in 0..self.dim {
            let diff = cp.output[d] - evaluated[d];
            let diff_sq = diff * diff;
            let tol_sq = self.tolerance[d] * self.tolerance[d];
            if diff_sq > tol_sq {
                sum += diff_sq - tol_sq;
            }
        }
        sum.sqrt()
    }

    /// Queue every span between adjacent keys that no longer fits.
    fn requeue_violations(&mut self) -> Result<bool, ReduceError> {
        let mut spans = Vec::new();
        for pair in self.output.points.windows(2) {
            let start = find_by_time(&self.control_points, pair[0].time)
                .ok_or(ReduceError::MissingControlPoint { time: pair[0].time })?;
            let end = find_by_time(&self.control_points, pair[1].time)
                .ok_or(ReduceError::MissingControlPoint { time: pair[1].time })?;
            if end >= start + 2 && (start + 1..end).any(|i| self.excess_error(i) > 0.0) {
                spans.push((start, end));
            }
        }
        let requeued = !spans.is_empty();
        for (start, end) in spans {
            log::trace!("re-queuing span {start}..{end} after tangent update");
            self.enqueue(start, end);
        }
        Ok(requeued)
    }

    /// Write the reduced keys for `[offset, offset + count)` into `dest`.
    pub fn splice_into(
        &self,
        dest: &mut InterpCurve,
        offset: usize,
        count: usize,
    ) -> Result<(), ReduceError> {
        splice(dest, &self.output, self.interval, offset, count)
    }
}

/// Reduce the combined `groups` over `interval`.
///
/// `relative_tolerance` is a fraction of each dimension's value range
/// (0.05 keeps every sample within 5% of its range).
pub fn reduce_curve(
    groups: &[CurveGroup<'_>],
    interval: Interval,
    relative_tolerance: f32,
) -> Result<InterpCurve, ReduceError> {
    let dim = groups
        .iter()
        .map(|g| g.offset + g.dims())
        .max()
        .unwrap_or(0);

    let mut claimed = vec![false; dim];
    for group in groups {
        for dimension in group.offset..group.offset + group.dims() {
            if claimed[dimension] {
                return Err(ReduceError::OverlappingGroups { dimension });
            }
            claimed[dimension] = true;
        }
    }

    let mut state = ReductionState::new(dim, interval, relative_tolerance);
    state.extract(groups)?;
    for group in groups {
        state.fill(group)?;
    }
    state.reduce()?;
    Ok(state.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurvePoint;

    fn seeded(curve: &InterpCurve, relative: f32) -> ReductionState {
        let (start, end) = curve.time_range().unwrap();
        let group = CurveGroup::new(curve, 0);
        let interval = Interval::new(start, end).padded();
        let mut state = ReductionState::new(curve.dim(), interval, relative);
        state.extract(&[group]).unwrap();
        state.fill(&group).unwrap();
        state
    }

    fn ramp_with_constant(locked: usize) -> InterpCurve {
        InterpCurve::from_points(
            (0..11)
                .map(|i| {
                    let mode = if i == locked {
                        InterpMode::Constant
                    } else {
                        InterpMode::CurveAuto
                    };
                    CurvePoint::scalar(i as f32 * 0.1, (i * i) as f32).with_mode(mode)
                })
                .collect(),
        )
    }

    #[test]
    fn tolerance_scales_with_range_and_never_drops_below_the_floor() {
        let curve = InterpCurve::from_points(
            (0..11)
                .map(|i| {
                    let t = i as f32 * 0.1;
                    CurvePoint::new(t, Channels::from_slice(&[i as f32 * 0.2, 3.0]))
                })
                .collect(),
        );
        let state = seeded(&curve, 0.05);
        assert_eq!(state.control_points().len(), 11);
        assert!((state.tolerance()[0] - 0.1).abs() < 1e-6);
        assert_eq!(state.tolerance()[1], MIN_TOLERANCE);
    }

    #[test]
    fn locked_key_seeds_two_independent_segments() {
        let state = seeded(&ramp_with_constant(5), 0.05);
        let segments: Vec<Segment> = state.pending_segments().collect();
        assert_eq!(
            segments,
            vec![Segment { start: 0, end: 5 }, Segment { start: 5, end: 10 }]
        );
        let placed: Vec<f32> = state.output().points.iter().map(|p| p.time).collect();
        assert_eq!(placed.len(), 3);
        assert!((placed[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn runs_without_interior_points_are_never_queued() {
        let curve = InterpCurve::from_points(vec![
            CurvePoint::scalar(0.0, 0.0).with_mode(InterpMode::CurveAuto),
            CurvePoint::scalar(0.1, 1.0).with_mode(InterpMode::Constant),
            CurvePoint::scalar(0.2, 0.0).with_mode(InterpMode::CurveAuto),
        ]);
        let state = seeded(&curve, 0.05);
        assert_eq!(state.pending_segments().count(), 0);

        let state = seeded(&ramp_with_constant(1), 0.05);
        assert!(state.pending_segments().all(|s| s.end >= s.start + 2));
        assert_eq!(state.pending_segments().count(), 1);
    }

    #[test]
    fn segment_past_the_control_points_is_an_error() {
        let mut state = seeded(&ramp_with_constant(5), 0.05);
        state.reduce().unwrap();
        assert_eq!(
            state.reduce_segment(Segment { start: 0, end: 11 }),
            Err(ReduceError::SegmentOutOfRange {
                start: 0,
                end: 11,
                len: 11
            })
        );
        assert!(state.reduce_segment(Segment { start: 3, end: 4 }).is_ok());
    }

    #[test]
    fn splice_into_matches_free_splice() {
        let curve = ramp_with_constant(5);
        let mut state = seeded(&curve, 0.05);
        state.reduce().unwrap();

        let mut via_state = curve.clone();
        state.splice_into(&mut via_state, 0, 1).unwrap();
        let mut via_fn = curve.clone();
        splice(&mut via_fn, state.output(), state.interval(), 0, 1).unwrap();

        assert_eq!(via_state, via_fn);
        assert_eq!(via_state.len(), state.output().len());
    }
}
