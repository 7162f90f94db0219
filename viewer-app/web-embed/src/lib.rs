//! Browser bundle of the radar viewer with its configuration baked in at
//! compile time via include_str!.
//!
//! Note: This crate is only intended to be compiled for wasm32-unknown-unknown.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;

use radar_viewer::prelude::*;

/// The baked-in viewer JSON from build time
static VIEWER_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/viewer.json"));

/// Canvas the page is expected to provide
const CANVAS_ID: &str = "radar-canvas";

/// Auto-start entry point when WASM module is loaded
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = ViewerConfig::from_json(VIEWER_JSON)
        .map_err(|e| JsValue::from_str(&format!("Invalid baked-in viewer config: {e:?}")))?;

    run_viewer(config, CANVAS_ID)
        .map_err(|e| JsValue::from_str(&format!("Failed to start radar viewer: {e:?}")))
}

/// Get the baked-in viewer config as JSON (for debugging)
#[wasm_bindgen]
pub fn get_viewer_json() -> String {
    VIEWER_JSON.to_string()
}
