//! Reduction parameters supplied by the host.

use serde::{Deserialize, Serialize};

/// Default tolerance, in percent of each dimension's value range.
pub const DEFAULT_TOLERANCE_PERCENT: f32 = 5.0;

/// Padding applied on both sides of the interval so keys sitting exactly on a
/// boundary survive floating-point round-off.
pub const INTERVAL_PADDING: f32 = 0.0005;

/// Closed time window `[start, end]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f32,
    pub end: f32,
}

impl Interval {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Widen by [`INTERVAL_PADDING`] on both ends.
    pub fn padded(self) -> Self {
        Self {
            start: self.start - INTERVAL_PADDING,
            end: self.end + INTERVAL_PADDING,
        }
    }

    #[inline]
    pub fn contains(&self, time: f32) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Host-facing configuration, mirroring the reduction dialog.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// Allowed deviation in percent of each dimension's value range.
    pub tolerance_percent: f32,
    /// Start of the window to reduce (seconds); if None, the track's first key.
    pub start_time: Option<f32>,
    /// End of the window to reduce (seconds); if None, the track's last key.
    pub end_time: Option<f32>,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            start_time: None,
            end_time: None,
        }
    }
}

impl ReductionConfig {
    /// Relative tolerance as a fraction of the value range.
    pub fn relative_tolerance(&self) -> f32 {
        let percent = if self.tolerance_percent.is_finite() && self.tolerance_percent >= 0.0 {
            self.tolerance_percent
        } else {
            log::warn!(
                "invalid tolerance_percent {}; using {}",
                self.tolerance_percent,
                DEFAULT_TOLERANCE_PERCENT
            );
            DEFAULT_TOLERANCE_PERCENT
        };
        percent / 100.0
    }

    /// Resolve the padded reduction window for a track spanning `range`.
    pub fn interval_for(&self, range: (f32, f32)) -> Interval {
        let start = self
            .start_time
            .filter(|t| t.is_finite())
            .unwrap_or(range.0);
        let end = self.end_time.filter(|t| t.is_finite()).unwrap_or(range.1);
        let interval = if end < start {
            log::warn!("reduction window [{start}, {end}] is reversed; swapping");
            Interval::new(end, start)
        } else {
            Interval::new(start, end)
        };
        interval.padded()
    }
}
