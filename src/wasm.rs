//! WASM bindings for in-browser extraction and pacing.
//!
//! Playback timing stays in JavaScript (`setTimeout`); these exports cover
//! extraction, tokenization and the rate curve.

use wasm_bindgen::prelude::*;

use crate::config::PeakRate;
use crate::extract::{self, SourceDocument};
use crate::pacing::rate_for_index;
use crate::tokenize::tokenize as tokenize_words;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Extract the text of a named document.
///
/// Rejects `.kfx` and unknown extensions with a readable message.
#[wasm_bindgen(js_name = extractText)]
pub fn extract_text(name: &str, data: &[u8]) -> Result<String, JsValue> {
    let doc = SourceDocument::new(name, data);
    extract::extract_text(&doc).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Split text into display words.
#[wasm_bindgen]
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_words(text)
}

/// Rate in wpm for the word at `index`, rounded as shown to the reader.
///
/// `peak` must lie in 100..=1200.
#[wasm_bindgen(js_name = rampRate)]
pub fn ramp_rate(index: usize, total: usize, peak: u32) -> Result<u32, JsValue> {
    let peak = PeakRate::try_from(peak).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(rate_for_index(index, total, f64::from(peak.wpm())).round() as u32)
}

/// `accept` attribute value for a file input.
#[wasm_bindgen(js_name = acceptAttr)]
pub fn accept_attr() -> String {
    extract::accept_attr()
}
