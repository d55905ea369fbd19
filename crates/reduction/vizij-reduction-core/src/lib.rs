//! Vizij Reduction Core (engine-agnostic)
//!
//! Keyframe reduction for densely sampled animation curves. A reduction takes
//! one or more curve groups sharing a time axis, picks the smallest set of
//! keys that reproduces every sample within a per-dimension tolerance, and
//! recomputes Hermite tangents for the kept keys. Hosts splice the result back
//! into their own storage with [`splice`].

pub mod channels;
pub mod config;
pub mod curve;
pub mod error;
pub mod extract;
pub mod locate;
pub mod reducer;
pub mod splice;
pub mod stored;
pub mod tangents;
pub mod track;

// Re-exports for consumers (adapters)
pub use channels::{Channels, Smoothness};
pub use config::{Interval, ReductionConfig};
pub use curve::{CurvePoint, InterpCurve, InterpMode};
pub use error::ReduceError;
pub use extract::{ControlPoint, CurveGroup};
pub use reducer::{reduce_curve, ReductionState, Segment};
pub use splice::splice;
pub use stored::{export_track_json, parse_track_json};
pub use track::{
    reduce_track, reduce_tracks, FloatTrack, LookupKey, MoveAxis, MoveAxisTrack, MoveTrack,
    ReductionSummary, Track,
};
