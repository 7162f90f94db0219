//! WASM API exports for JavaScript interop
//!
//! `JsRadarViewer` is the host page's control surface: it mounts the viewer on
//! a canvas and forwards controls through the shared [`ViewerHandle`].

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;

use crate::core::ViewerConfig;
use crate::runtime::run_in_canvas;
use crate::sim::ViewerHandle;

fn js_err(context: &str, report: impl std::fmt::Debug) -> JsValue {
    JsValue::from_str(&format!("{context}: {report:?}"))
}

#[wasm_bindgen]
pub struct JsRadarViewer {
    config: ViewerConfig,
    /// Canvas ID for rendering
    canvas_id: String,
    handle: ViewerHandle,
    mounted: bool,
}

#[wasm_bindgen]
impl JsRadarViewer {
    /// Create a viewer from a (possibly partial or empty) JSON config.
    ///
    /// # Arguments
    /// * `json` - JSON string for `ViewerConfig`; `""` uses the defaults
    /// * `canvas_id` - HTML canvas element ID (without #)
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str, canvas_id: &str) -> Result<JsRadarViewer, JsValue> {
        console_error_panic_hook::set_once();
        let config = if json.trim().is_empty() {
            ViewerConfig::default()
        } else {
            ViewerConfig::from_json(json).map_err(|e| js_err("Invalid viewer config", e))?
        };

        Ok(JsRadarViewer {
            config,
            canvas_id: canvas_id.to_string(),
            handle: ViewerHandle::default(),
            mounted: false,
        })
    }

    /// Start rendering into the canvas.
    ///
    /// A page hosts one viewer for its whole life: the browser event loop
    /// cannot be restarted, so mounting again after `unmount()`, or mounting
    /// a second `JsRadarViewer`, returns an error.
    #[wasm_bindgen]
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if self.mounted {
            let msg = JsValue::from_str("Radar viewer was already mounted; a page supports one mount");
            web_sys::console::warn_1(&msg);
            return Err(msg);
        }
        self.mounted = true;
        run_in_canvas(self.config.clone(), &self.canvas_id, self.handle.clone())
            .map_err(|e| js_err("Failed to start radar viewer", e))
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&self) {
        self.handle.toggle_pause();
    }

    #[wasm_bindgen(js_name = resetRotation)]
    pub fn reset_rotation(&self) {
        self.handle.reset_rotation();
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.handle.toggle_fullscreen();
    }

    /// Tear the viewer down on its next frame. The canvas stays empty; the
    /// page cannot mount another viewer afterwards.
    #[wasm_bindgen]
    pub fn unmount(&self) {
        self.handle.unmount();
    }

    #[wasm_bindgen(getter, js_name = liveCount)]
    pub fn live_count(&self) -> usize {
        self.handle.live_count()
    }

    #[wasm_bindgen(getter, js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.handle.outputs.is_paused()
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.handle.outputs.is_loading()
    }

    #[wasm_bindgen(getter, js_name = canvasId)]
    pub fn canvas_id(&self) -> String {
        self.canvas_id.clone()
    }

    /// The effective configuration, defaults filled in.
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.config
            .to_json()
            .map_err(|e| js_err("Failed to serialize viewer config", e))
    }
}
