//! Shared fixture access for reduction tests.
//!
//! Fixtures live under the workspace `fixtures/` directory and are listed in
//! `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    tracks: HashMap<String, TrackEntry>,
}

/// A stored track plus the key count a default reduction is expected to keep.
#[derive(Debug, Deserialize)]
struct TrackEntry {
    path: String,
    #[serde(default)]
    expected_keys: Option<usize>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod tracks {
    use super::*;

    /// Fixture names, sorted.
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.tracks.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.tracks, "track", name)?;
        read_to_string(&entry.path)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.tracks, "track", name)?;
        super::load_json(&entry.path)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.tracks, "track", name)?;
        Ok(resolve_path(&entry.path))
    }

    /// Total keys a reduction with the default configuration should leave.
    pub fn expected_keys(name: &str) -> Result<Option<usize>> {
        let entry = lookup(&MANIFEST.tracks, "track", name)?;
        Ok(entry.expected_keys)
    }
}
