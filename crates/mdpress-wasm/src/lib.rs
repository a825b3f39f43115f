use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequestOptions {
    escape_inline_code: Option<bool>,
    sanitized: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResult {
    html: String,
    fragments: usize,
}

#[wasm_bindgen]
pub fn convert(source: &str) -> Result<JsValue, JsValue> {
    convert_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn convert_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let (convert_options, sanitized) = options_from_js(options)?;

    let document = mdpress_core::Document::new(source);
    let fragments = mdpress_core::convert(&document, &convert_options);
    let count = fragments.len();
    let mut html = fragments.join("\n");
    if sanitized {
        html = mdpress_core::sanitize(&html);
    }

    let result = ConvertResult {
        html,
        fragments: count,
    };
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<(mdpress_core::ConvertOptions, bool), JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok((mdpress_core::ConvertOptions::default(), false));
    }
    let parsed: ConvertRequestOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let mut options = mdpress_core::ConvertOptions::default();
    if let Some(escape_inline_code) = parsed.escape_inline_code {
        options.escape_inline_code = escape_inline_code;
    }
    Ok((options, parsed.sanitized.unwrap_or(false)))
}
