//! Control point extraction and value filling.
//!
//! Extraction turns the source samples inside the interval into the shared,
//! deduplicated control point list and seeds the segment queue. Filling then
//! resolves each control point's value one curve group at a time and derives
//! the absolute tolerance for that group's dimensions.

use crate::channels::{Channels, Smoothness};
use crate::curve::{InterpCurve, InterpMode};
use crate::error::ReduceError;
use crate::locate::{is_equivalent, Timed, KEY_TIME_EPSILON};
use crate::reducer::ReductionState;

/// Time distance within which a source sample is copied rather than evaluated.
pub const SAMPLE_MATCH_EPSILON: f32 = 0.01;

/// Floor for the absolute per-dimension tolerance.
pub const MIN_TOLERANCE: f32 = 1e-4;

/// Floor for the arrive/leave comparison on broken-tangent corners.
pub const MIN_SMOOTHNESS_TOLERANCE: f32 = 1e-8;

/// A dense sample that the reduction may keep or drop.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPoint {
    pub time: f32,
    /// Value across all combined dimensions.
    pub output: Channels,
    /// `CurveUser` for reducible samples, the source mode for locked ones.
    pub mode: InterpMode,
    /// Per-dimension tangent continuity; only read for `CurveBreak` corners.
    pub smoothness: Smoothness,
}

impl ControlPoint {
    fn new(time: f32, mode: InterpMode, dim: usize) -> Self {
        Self {
            time,
            output: Channels::zeros(dim),
            mode,
            smoothness: Smoothness::from_elem(true, dim),
        }
    }

    /// Locked control points must appear unchanged in the output.
    #[inline]
    pub fn is_locked(&self) -> bool {
        !self.mode.is_smooth()
    }
}

impl Timed for ControlPoint {
    #[inline]
    fn time(&self) -> f32 {
        self.time
    }
}

/// One source curve and where its dimensions land in the combined tuple.
#[derive(Clone, Copy, Debug)]
pub struct CurveGroup<'a> {
    pub curve: &'a InterpCurve,
    pub offset: usize,
}

impl<'a> CurveGroup<'a> {
    pub fn new(curve: &'a InterpCurve, offset: usize) -> Self {
        Self { curve, offset }
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.curve.dim()
    }
}

impl ReductionState {
    /// Build the control point list from every group's samples in the interval.
    ///
    /// Locked samples are placed into the output curve right away and split
    /// the smooth runs into separate segments. The first and last control
    /// point are always kept.
    pub fn extract(&mut self, groups: &[CurveGroup<'_>]) -> Result<(), ReduceError> {
        for group in groups {
            self.check_group(group)?;
        }

        let interval = self.interval;
        let mut samples: Vec<(f32, InterpMode)> = groups
            .iter()
            .flat_map(|g| g.curve.points.iter())
            .filter(|p| interval.contains(p.time))
            .map(|p| (p.time, p.mode))
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let dim = self.dim;
        for (time, mode) in samples {
            let mode = if mode.is_smooth() {
                InterpMode::CurveUser
            } else {
                mode
            };
            let merged = match self.control_points.last_mut() {
                Some(last) if is_equivalent(last.time, time, KEY_TIME_EPSILON) => {
                    if !last.is_locked() {
                        last.mode = mode;
                    }
                    true
                }
                _ => false,
            };
            if !merged {
                self.control_points.push(ControlPoint::new(time, mode, dim));
            }
        }

        let (first_time, last_time) = match (self.control_points.first(), self.control_points.last())
        {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => {
                return Err(ReduceError::NoControlPoints {
                    start: interval.start,
                    end: interval.end,
                })
            }
        };

        let mut run_start = 0;
        let mut run_open = false;
        for index in 0..self.control_points.len() {
            let (time, locked) = {
                let cp = &self.control_points[index];
                (cp.time, cp.is_locked())
            };
            if locked {
                // Placeholder value, finalized in `reduce`.
                self.output.add_point(time, Channels::zeros(dim));
                if run_open {
                    self.enqueue(run_start, index);
                }
                run_start = index;
                run_open = false;
            } else {
                run_open = true;
            }
        }

        let has_first = self
            .output
            .points
            .first()
            .is_some_and(|k| is_equivalent(k.time, first_time, KEY_TIME_EPSILON));
        if !has_first {
            self.output.add_point(first_time, Channels::zeros(dim));
        }
        let has_last = self
            .output
            .points
            .last()
            .is_some_and(|k| is_equivalent(k.time, last_time, KEY_TIME_EPSILON));
        if !has_last {
            self.output.add_point(last_time, Channels::zeros(dim));
        }

        if run_open {
            self.enqueue(run_start, self.control_points.len() - 1);
        }

        log::trace!(
            "extracted {} control points ({} kept up front, {} segments)",
            self.control_points.len(),
            self.output.len(),
            self.segment_queue.len()
        );
        Ok(())
    }

    /// Resolve control point values for one group and derive its tolerances.
    pub fn fill(&mut self, group: &CurveGroup<'_>) -> Result<(), ReduceError> {
        self.check_group(group)?;
        let dims = group.dims();
        if dims == 0 {
            return Ok(());
        }
        let first_time = match self.control_points.first() {
            Some(cp) => cp.time,
            None => {
                return Err(ReduceError::NoControlPoints {
                    start: self.interval.start,
                    end: self.interval.end,
                })
            }
        };

        let offset = group.offset;
        let relative = self.relative_tolerance;
        let samples = &group.curve.points;
        let mut min = vec![f32::MAX; dims];
        let mut max = vec![f32::MIN; dims];
        let mut track = |i: usize, value: f32| {
            min[i] = min[i].min(value);
            max[i] = max[i].max(value);
        };

        let mut cursor = samples.partition_point(|p| p.time < first_time);
        for cp in &mut self.control_points {
            while cursor < samples.len() && samples[cursor].time < cp.time - SAMPLE_MATCH_EPSILON {
                cursor += 1;
            }

            match samples
                .get(cursor)
                .filter(|s| is_equivalent(s.time, cp.time, SAMPLE_MATCH_EPSILON))
            {
                Some(sample) => {
                    for i in 0..dims {
                        let value = sample.value[i];
                        cp.output[offset + i] = value;
                        track(i, value);
                    }
                    if cp.mode == InterpMode::CurveBreak {
                        for i in 0..dims {
                            let arrive = sample.arrive_tangent[i];
                            let tolerance = (arrive * relative).abs().max(MIN_SMOOTHNESS_TOLERANCE);
                            cp.smoothness[offset + i] =
                                is_equivalent(sample.leave_tangent[i], arrive, tolerance);
                        }
                    }
                    cursor += 1;
                    // Samples merged into this control point must not be
                    // matched to the next one.
                    while cursor < samples.len()
                        && is_equivalent(samples[cursor].time, cp.time, KEY_TIME_EPSILON)
                    {
                        cursor += 1;
                    }
                }
                None => {
                    // Another group owns this time; sample our curve there.
                    if let Some(value) = group.curve.eval(cp.time) {
                        for i in 0..dims {
                            cp.output[offset + i] = value[i];
                            track(i, value[i]);
                        }
                    }
                }
            }
        }

        for i in 0..dims {
            let range = if min[i] <= max[i] { max[i] - min[i] } else { 0.0 };
            self.tolerance[offset + i] = (relative * range).max(MIN_TOLERANCE);
        }
        Ok(())
    }

    fn check_group(&self, group: &CurveGroup<'_>) -> Result<(), ReduceError> {
        group.curve.validate()?;
        if group.offset + group.dims() > self.dim {
            return Err(ReduceError::DimensionMismatch {
                offset: group.offset,
                count: group.dims(),
                dim: self.dim,
            });
        }
        Ok(())
    }
}
