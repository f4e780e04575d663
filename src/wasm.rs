//! WASM bindings for browser-based auditing.
//!
//! Flags arrive as a query string, e.g. `includeCss=1&pixelThreshold=4000000`.

use wasm_bindgen::prelude::*;

use crate::{Options, audit_epub};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Audit EPUB bytes and return the JSON report.
#[wasm_bindgen]
pub fn audit(data: &[u8], flags: &str, display_prefix: &str) -> Result<String, JsValue> {
    let options = Options::from_query(flags).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let report = audit_epub(data, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    report
        .to_json(display_prefix)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Plain-text summary of an audit.
#[wasm_bindgen]
pub fn audit_summary(data: &[u8], flags: &str, display_prefix: &str) -> Result<String, JsValue> {
    let options = Options::from_query(flags).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let report = audit_epub(data, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(report.summary(display_prefix))
}
