//! Track-level reduction for the track kinds an editor exposes.
//!
//! - `Float`: a single property curve.
//! - `Move`: position and Euler rotation curves reduced together as one
//!   6-dimensional curve so both keep identical key times, or a list of
//!   per-axis sub-tracks reduced one by one.
//! - `MoveAxis`: a single axis of a split move track.
//!
//! Move and MoveAxis tracks carry a lookup track with one entry per key; it is
//! rebuilt (unnamed) after every reduction.

use serde::{Deserialize, Serialize};

use crate::config::{Interval, ReductionConfig};
use crate::curve::InterpCurve;
use crate::error::ReduceError;
use crate::extract::CurveGroup;
use crate::reducer::reduce_curve;
use crate::splice::splice;

/// Offset of the rotation curve inside a combined move reduction.
pub const ROTATION_OFFSET: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Track {
    Float(FloatTrack),
    Move(MoveTrack),
    MoveAxis(MoveAxisTrack),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatTrack {
    pub name: String,
    pub curve: InterpCurve,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTrack {
    pub name: String,
    #[serde(default)]
    pub position: InterpCurve,
    /// Euler angles.
    #[serde(default)]
    pub rotation: InterpCurve,
    #[serde(default)]
    pub lookup: Vec<LookupKey>,
    /// Per-axis tracks; when present they replace position/rotation.
    #[serde(default)]
    pub sub_tracks: Vec<Track>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAxis {
    TranslationX,
    TranslationY,
    TranslationZ,
    RotationX,
    RotationY,
    RotationZ,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveAxisTrack {
    pub name: String,
    pub axis: MoveAxis,
    pub curve: InterpCurve,
    #[serde(default)]
    pub lookup: Vec<LookupKey>,
}

/// Lookup entry tying a key time to an optional named target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupKey {
    pub time: f32,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Key counts before and after reducing one track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionSummary {
    pub name: String,
    pub keys_before: usize,
    pub keys_after: usize,
}

impl Track {
    pub fn name(&self) -> &str {
        match self {
            Track::Float(t) => &t.name,
            Track::Move(t) => &t.name,
            Track::MoveAxis(t) => &t.name,
        }
    }

    /// Total keys across every curve of the track (sub-tracks included).
    pub fn key_count(&self) -> usize {
        match self {
            Track::Float(t) => t.curve.len(),
            Track::Move(t) => {
                t.position.len()
                    + t.rotation.len()
                    + t.sub_tracks.iter().map(Track::key_count).sum::<usize>()
            }
            Track::MoveAxis(t) => t.curve.len(),
        }
    }

    /// Time of the earliest and latest key.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        match self {
            Track::Float(t) => t.curve.time_range(),
            Track::MoveAxis(t) => t.curve.time_range(),
            Track::Move(t) => {
                let ranges = [t.position.time_range(), t.rotation.time_range()]
                    .into_iter()
                    .flatten()
                    .chain(t.sub_tracks.iter().filter_map(Track::time_range));
                ranges.reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
            }
        }
    }

    /// Fill omitted tangents with zeros, recursively.
    pub fn fill_missing_tangents(&mut self) {
        match self {
            Track::Float(t) => t.curve.fill_missing_tangents(),
            Track::MoveAxis(t) => t.curve.fill_missing_tangents(),
            Track::Move(t) => {
                t.position.fill_missing_tangents();
                t.rotation.fill_missing_tangents();
                t.sub_tracks
                    .iter_mut()
                    .for_each(Track::fill_missing_tangents);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ReduceError> {
        match self {
            Track::Float(t) => t.curve.validate(),
            Track::MoveAxis(t) => t.curve.validate(),
            Track::Move(t) => {
                t.position.validate()?;
                t.rotation.validate()?;
                t.sub_tracks.iter().try_for_each(Track::validate)
            }
        }
    }
}

/// Reduce one track in place.
///
/// A track with no keys inside the configured window is left untouched.
pub fn reduce_track(
    track: &mut Track,
    config: &ReductionConfig,
) -> Result<ReductionSummary, ReduceError> {
    let keys_before = track.key_count();
    let relative = config.relative_tolerance();

    match track {
        Track::Float(t) => {
            reduce_single(&mut t.curve, config, relative)?;
        }
        Track::MoveAxis(t) => {
            if reduce_single(&mut t.curve, config, relative)? {
                t.lookup = unnamed_lookup(&t.curve);
            }
        }
        Track::Move(t) if t.sub_tracks.is_empty() => reduce_move(t, config, relative)?,
        Track::Move(t) => {
            // Written back only once every sub-track succeeded.
            let mut sub_tracks = t.sub_tracks.clone();
            for sub in &mut sub_tracks {
                reduce_track(sub, config)?;
            }
            t.sub_tracks = sub_tracks;
        }
    }

    let summary = ReductionSummary {
        name: track.name().to_string(),
        keys_before,
        keys_after: track.key_count(),
    };
    log::debug!(
        "reduced track '{}': {} -> {} keys",
        summary.name,
        summary.keys_before,
        summary.keys_after
    );
    Ok(summary)
}

/// Reduce several tracks with the same configuration.
///
/// Either every track is rewritten or, on error, none is.
pub fn reduce_tracks(
    tracks: &mut [Track],
    config: &ReductionConfig,
) -> Result<Vec<ReductionSummary>, ReduceError> {
    let mut reduced = tracks.to_vec();
    let summaries = reduced
        .iter_mut()
        .map(|track| reduce_track(track, config))
        .collect::<Result<Vec<_>, _>>()?;
    tracks.clone_from_slice(&reduced);
    Ok(summaries)
}

/// Returns whether `curve` was rewritten.
fn reduce_single(
    curve: &mut InterpCurve,
    config: &ReductionConfig,
    relative: f32,
) -> Result<bool, ReduceError> {
    let Some(range) = curve.time_range() else {
        return Ok(false);
    };
    let interval = config.interval_for(range);
    let Some(reduced) = reduce_or_skip(&[CurveGroup::new(curve, 0)], interval, relative)? else {
        return Ok(false);
    };
    let dims = curve.dim();
    splice(curve, &reduced, interval, 0, dims)?;
    Ok(true)
}

fn reduce_move(
    track: &mut MoveTrack,
    config: &ReductionConfig,
    relative: f32,
) -> Result<(), ReduceError> {
    let range = match (track.position.time_range(), track.rotation.time_range()) {
        (Some(a), Some(b)) => (a.0.min(b.0), a.1.max(b.1)),
        (Some(r), None) | (None, Some(r)) => r,
        (None, None) => return Ok(()),
    };
    let interval = config.interval_for(range);

    let reduced = {
        let mut groups = Vec::with_capacity(2);
        if !track.position.is_empty() {
            groups.push(CurveGroup::new(&track.position, 0));
        }
        if !track.rotation.is_empty() {
            groups.push(CurveGroup::new(&track.rotation, ROTATION_OFFSET));
        }
        reduce_or_skip(&groups, interval, relative)?
    };
    let Some(reduced) = reduced else {
        return Ok(());
    };

    if !track.position.is_empty() {
        let dims = track.position.dim();
        splice(&mut track.position, &reduced, interval, 0, dims)?;
    }
    if !track.rotation.is_empty() {
        let dims = track.rotation.dim();
        splice(&mut track.rotation, &reduced, interval, ROTATION_OFFSET, dims)?;
    }

    let keyed = if track.position.is_empty() {
        &track.rotation
    } else {
        &track.position
    };
    track.lookup = unnamed_lookup(keyed);
    Ok(())
}

/// `None` when the window holds no keys.
fn reduce_or_skip(
    groups: &[CurveGroup<'_>],
    interval: Interval,
    relative: f32,
) -> Result<Option<InterpCurve>, ReduceError> {
    match reduce_curve(groups, interval, relative) {
        Ok(reduced) => Ok(Some(reduced)),
        Err(ReduceError::NoControlPoints { start, end }) => {
            log::debug!("no keys in [{start}, {end}]; skipping");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn unnamed_lookup(curve: &InterpCurve) -> Vec<LookupKey> {
    curve
        .points
        .iter()
        .map(|p| LookupKey {
            time: p.time,
            group_name: None,
        })
        .collect()
}
