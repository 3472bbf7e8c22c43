use hanfmt_core::FormattingConfig;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Formatting Config
// ============================================================================

/// Read a `FormattingConfig` from a JS object.
///
/// `undefined` and `null` select the recommended preset. Field names follow
/// the camelCase JSON form (`fullwidthPunctuation`, `quoteStyle`, ...), and
/// omitted fields keep their defaults.
fn parse_config(config: JsValue) -> Result<FormattingConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(FormattingConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

// ============================================================================
// Format API
// ============================================================================

/// Formats a Markdown document.
///
/// Code, links, math, HTML and frontmatter are returned byte-identical; only
/// the prose between them is normalized.
///
/// # Example (JavaScript)
///
/// ```javascript
/// import { formatMarkdown } from './hanfmt_wasm';
///
/// formatMarkdown('你好,世界`a,b`', { fullwidthPunctuation: true });
/// // => '你好，世界`a,b`'
/// ```
#[wasm_bindgen(js_name = formatMarkdown)]
pub fn format_markdown(text: &str, config: JsValue) -> Result<String, JsError> {
    let config = parse_config(config)?;
    Ok(hanfmt_core::format_markdown(text, &config))
}

/// Formats an editor selection as plain prose, without protected regions.
#[wasm_bindgen(js_name = formatSelection)]
pub fn format_selection(text: &str, config: JsValue) -> Result<String, JsError> {
    let config = parse_config(config)?;
    Ok(hanfmt_core::format_selection(text, &config))
}

/// Formats a document and reports diagnostics found in the input.
///
/// Returns `{ text, changed, diagnostics: { items } }`.
#[wasm_bindgen(js_name = formatMarkdownWithReport)]
pub fn format_markdown_with_report(text: &str, config: JsValue) -> Result<JsValue, JsError> {
    let config = parse_config(config)?;
    to_js(&hanfmt_core::format_markdown_with_report(text, &config))
}

// ============================================================================
// Analysis API
// ============================================================================

/// Scans a document without rewriting it.
///
/// Returns `{ regions, segments, diagnostics }`. Region and segment offsets
/// are codepoint indices, not UTF-16 units.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { diagnostics } = analyzeMarkdown('文字\n```\n没有结束');
/// // diagnostics.items = [
/// //   { kind: "unclosedCodeFence", location: { line: 2, column: 1 }, marker: "`" }
/// // ]
/// ```
#[wasm_bindgen(js_name = analyzeMarkdown)]
pub fn analyze_markdown(text: &str) -> Result<JsValue, JsError> {
    to_js(&hanfmt_core::analyze_markdown(text))
}

/// Returns the configuration with every rule enabled, as a JS object.
#[wasm_bindgen(js_name = allEnabledConfig)]
pub fn all_enabled_config() -> Result<JsValue, JsError> {
    to_js(&FormattingConfig::all_enabled())
}
