//! Error types for key reduction.
//!
//! Every variant describes inconsistent caller input. A reduction that
//! returns an error leaves the caller's curves untouched.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReduceError {
    /// No source sample lies inside the requested interval.
    #[error("no control points inside interval [{start}, {end}]")]
    NoControlPoints { start: f32, end: f32 },

    /// An output key has no control point at its time.
    #[error("no control point matches output key at time {time}")]
    MissingControlPoint { time: f32 },

    /// A curve group does not fit the combined dimension tuple.
    #[error(
        "curve group at offset {offset} with {count} dimensions does not fit a {dim}-dimensional reduction"
    )]
    DimensionMismatch {
        offset: usize,
        count: usize,
        dim: usize,
    },

    /// A segment does not describe a span of the control point list.
    #[error("segment {start}..{end} is outside {len} control points")]
    SegmentOutOfRange { start: usize, end: usize, len: usize },

    /// Two curve groups write the same dimension.
    #[error("curve groups overlap at dimension {dimension}")]
    OverlappingGroups { dimension: usize },

    /// A key's value or tangent length disagrees with the rest of its curve.
    #[error("key {index} has {found} channels, expected {expected}")]
    ChannelCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Key times must be finite and non-decreasing.
    #[error("key {index} at time {time} is out of order")]
    UnsortedKeys { index: usize, time: f32 },

    #[error("parse error: {0}")]
    Parse(String),
}
