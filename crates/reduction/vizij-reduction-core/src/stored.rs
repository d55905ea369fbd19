//! JSON loading and export of tracks.
//!
//! A stored track is the serde form of [`Track`], tagged by `"type"`:
//!
//! ```json
//! { "type": "float", "name": "fov",
//!   "curve": [ { "time": 0.0, "value": [1.0], "mode": "curve_auto" } ] }
//! ```
//!
//! Tangents may be omitted and default to zero.

use crate::error::ReduceError;
use crate::track::Track;

/// Parse a stored track, filling omitted tangents and validating key order.
pub fn parse_track_json(s: &str) -> Result<Track, ReduceError> {
    let mut track: Track =
        serde_json::from_str(s).map_err(|e| ReduceError::Parse(e.to_string()))?;
    track.fill_missing_tangents();
    track.validate()?;
    Ok(track)
}

/// Export a track as serde_json::Value.
pub fn export_track_json(track: &Track) -> serde_json::Value {
    serde_json::to_value(track).unwrap_or(serde_json::Value::Null)
}
