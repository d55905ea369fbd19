use anyhow::Result;
use vizij_reduction_core::{
    export_track_json, parse_track_json, reduce_track, InterpMode, ReductionConfig, Track,
};

fn load(name: &str) -> Result<Track> {
    let json = vizij_test_fixtures::tracks::json(name)?;
    Ok(parse_track_json(&json)?)
}

#[test]
fn fixtures_reduce_to_expected_key_counts() -> Result<()> {
    for name in vizij_test_fixtures::tracks::keys() {
        let mut track = load(&name)?;
        let summary = reduce_track(&mut track, &ReductionConfig::default())?;
        if let Some(expected) = vizij_test_fixtures::tracks::expected_keys(&name)? {
            assert_eq!(summary.keys_after, expected, "fixture {name}");
        }
        assert!(summary.keys_after <= summary.keys_before, "fixture {name}");
        track.validate()?;
    }
    Ok(())
}

#[test]
fn constant_key_survives_in_move_axis_fixture() -> Result<()> {
    let mut track = load("door-axis-constant")?;
    reduce_track(&mut track, &ReductionConfig::default())?;
    let Track::MoveAxis(axis) = &track else {
        panic!("expected move_axis fixture, got {track:?}");
    };
    let constant: Vec<_> = axis
        .curve
        .points
        .iter()
        .filter(|k| k.mode == InterpMode::Constant)
        .collect();
    assert_eq!(constant.len(), 1);
    assert!((constant[0].time - 0.5).abs() < 1e-6);
    assert_eq!(constant[0].value[0], 1.0);

    let lookup_times: Vec<f32> = axis.lookup.iter().map(|k| k.time).collect();
    let key_times: Vec<f32> = axis.curve.points.iter().map(|k| k.time).collect();
    assert_eq!(lookup_times, key_times);
    Ok(())
}

#[test]
fn camera_lookup_loses_group_names() -> Result<()> {
    let mut track = load("camera-move")?;
    let Track::Move(before) = &track else {
        panic!("expected move fixture");
    };
    assert_eq!(before.lookup[0].group_name.as_deref(), Some("target"));

    reduce_track(&mut track, &ReductionConfig::default())?;
    let Track::Move(after) = &track else {
        unreachable!()
    };
    assert_eq!(after.lookup.len(), after.position.len());
    assert!(after.lookup.iter().all(|k| k.group_name.is_none()));
    Ok(())
}

#[test]
fn reduced_track_exports_and_reloads() -> Result<()> {
    let mut track = load("rig-subtracks")?;
    reduce_track(&mut track, &ReductionConfig::default())?;
    let exported = export_track_json(&track);
    assert_eq!(exported["type"], "move");
    assert_eq!(exported["sub_tracks"][1]["axis"], "rotation_z");

    let reloaded = parse_track_json(&exported.to_string())?;
    assert_eq!(reloaded, track);
    Ok(())
}

#[test]
fn tolerance_from_json_config_is_honoured() -> Result<()> {
    let config: ReductionConfig = serde_json::from_str(r#"{ "tolerance_percent": 50.0 }"#)?;
    let mut track = load("sine-float")?;
    let summary = reduce_track(&mut track, &config)?;
    assert_eq!(summary.keys_after, 3);
    Ok(())
}
