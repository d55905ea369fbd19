use js_sys::JSON;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_reduction_core::{
    export_track_json, parse_track_json, reduce_track as reduce_core_track, ReductionConfig,
    ReductionSummary, Track,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<ReductionConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(ReductionConfig::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

#[derive(Serialize)]
struct Reduced<'a> {
    track: serde_json::Value,
    summary: &'a ReductionSummary,
}

/// Reduce a track object (the stored JSON shape, tagged by `type`).
///
/// `config` is optional JSON matching ReductionConfig, e.g.
///   reduce_track(track, { tolerance_percent: 2.5, start_time: 0.5 })
/// Returns `{ track, summary }`.
#[wasm_bindgen(js_name = reduce_track)]
pub fn reduce_track(track: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    console_error_panic_hook::set_once();

    if jsvalue_is_undefined_or_null(&track) {
        return Err(JsError::new("reduce_track: track is null/undefined"));
    }
    // Stringify so the core parser can fill tangents and validate.
    let s = JSON::stringify(&track)
        .map_err(|e| JsError::new(&format!("reduce_track stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new("reduce_track: stringify produced non-string"))?;
    let mut parsed = parse_track_json(&s)
        .map_err(|e| JsError::new(&format!("reduce_track parse error: {e}")))?;
    let cfg = parse_config(config)?;

    let summary = reduce_core_track(&mut parsed, &cfg)
        .map_err(|e| JsError::new(&format!("reduce_track error: {e}")))?;
    let out = Reduced {
        track: export_track_json(&parsed),
        summary: &summary,
    };
    // Plain objects rather than Maps for the exported JSON.
    let serializer = swb::Serializer::json_compatible();
    out.serialize(&serializer)
        .map_err(|e| JsError::new(&format!("reduce_track output error: {e}")))
}

/// Reduce a track given as a JSON string and return the reduced track as JSON.
#[wasm_bindgen(js_name = reduce_track_json)]
pub fn reduce_track_json(json: &str, config: JsValue) -> Result<String, JsError> {
    console_error_panic_hook::set_once();

    let mut track: Track =
        parse_track_json(json).map_err(|e| JsError::new(&format!("parse error: {e}")))?;
    let cfg = parse_config(config)?;
    reduce_core_track(&mut track, &cfg)
        .map_err(|e| JsError::new(&format!("reduce_track_json error: {e}")))?;
    Ok(export_track_json(&track).to_string())
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
