use hanfmt_core::{FormattingConfig, QuoteStyle};
use hanfmt_wasm::{
    analyze_markdown, format_markdown, format_markdown_with_report, format_selection,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[derive(Deserialize, Debug)]
struct FormatReport {
    text: String,
    changed: bool,
}

#[derive(Deserialize, Debug)]
struct DocumentAnalysis {
    regions: Vec<Region>,
    diagnostics: Diagnostics,
}

#[derive(Deserialize, Debug)]
struct Region {
    start: usize,
    end: usize,
}

#[derive(Deserialize, Debug)]
struct Diagnostics {
    items: Vec<DiagnosticEntry>,
}

#[derive(Deserialize, Debug)]
struct DiagnosticEntry {
    kind: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LimitOnly {
    consecutive_punctuation_limit: u8,
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).expect("serialize config")
}

#[wasm_bindgen_test]
fn format_with_default_config() {
    let output = format_markdown("你好,世界", JsValue::UNDEFINED).expect("format should succeed");
    assert_eq!(output, "你好，世界");

    let output = format_markdown("中文English", JsValue::NULL).expect("format should succeed");
    assert_eq!(output, "中文 English");
}

#[wasm_bindgen_test]
fn selection_ignores_inline_code() {
    let output = format_markdown("说`你,好`", JsValue::UNDEFINED).expect("format should succeed");
    assert_eq!(output, "说`你,好`");

    let output = format_selection("说`你,好`", JsValue::UNDEFINED).expect("format should succeed");
    assert_eq!(output, "说`你，好`");
}

#[wasm_bindgen_test]
fn format_with_custom_config() {
    let no_punctuation = FormattingConfig {
        fullwidth_punctuation: false,
        ..FormattingConfig::default()
    };
    let output =
        format_markdown("你好,世界", to_js(&no_punctuation)).expect("format should succeed");
    assert_eq!(output, "你好,世界");

    let guillemets = FormattingConfig {
        quote_style: QuoteStyle::Guillemets,
        ..FormattingConfig::default()
    };
    let output =
        format_markdown("他说\"你好\"", to_js(&guillemets)).expect("format should succeed");
    assert_eq!(output, "他说«你好»");
}

#[wasm_bindgen_test]
fn invalid_punctuation_limit_is_rejected() {
    let bad = to_js(&LimitOnly {
        consecutive_punctuation_limit: 7,
    });
    assert!(format_markdown("你好", bad).is_err());
}

#[wasm_bindgen_test]
fn report_flags_changes() {
    let report =
        format_markdown_with_report("你好,世界", JsValue::UNDEFINED).expect("report should succeed");
    let report: FormatReport = serde_wasm_bindgen::from_value(report).expect("deserialize report");
    assert!(report.changed);
    assert_eq!(report.text, "你好，世界");
}

#[wasm_bindgen_test]
fn analysis_reports_regions_and_diagnostics() {
    let analysis = analyze_markdown("看`代码`\n```\n没有结束").expect("analysis should succeed");
    let analysis: DocumentAnalysis =
        serde_wasm_bindgen::from_value(analysis).expect("deserialize analysis");

    assert_eq!(analysis.regions.len(), 1);
    assert_eq!((analysis.regions[0].start, analysis.regions[0].end), (1, 5));
    assert_eq!(analysis.diagnostics.items.len(), 1);
    assert_eq!(analysis.diagnostics.items[0].kind, "unclosedCodeFence");
}
