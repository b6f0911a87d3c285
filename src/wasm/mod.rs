//! WASM module: browser adapters for the shell
//!
//! - `BrowserHistory`: `History` over `window.history` / `window.location`
//! - `resolvePath`: route inspection from JavaScript
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Host page (JS connector)         │
//! │  hashchange / popstate / postMessage    │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │                 Shell                   │
//! │  routing, frames, bridge, modals        │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │            BrowserHistory               │
//! │  pushState / replaceState / location    │
//! └─────────────────────────────────────────┘
//! ```

mod history;

pub use history::BrowserHistory;

use crate::config::ShellConfig;
use crate::context::AppContext;
use crate::navigation::PathResolver;
use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// Resolve `path` against a JSON configuration; resolves to PathData.
#[wasm_bindgen(js_name = resolvePath)]
pub fn resolve_path(config_json: String, path: String) -> js_sys::Promise {
    wasm_bindgen_futures::future_to_promise(async move {
        let config = ShellConfig::from_json_str(&config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let data = PathResolver::new(AppContext::new(config)).resolve(&path).await;
        serde_wasm_bindgen::to_value(&data).map_err(|e| JsValue::from_str(&e.to_string()))
    })
}
