//! Document-level properties of the normalizer.

use hanfmt_core::protected::scan_protected_regions;
use hanfmt_core::{
    FormattingConfig, PunctuationLimit, extract_formattable_segments, format_markdown,
    format_selection, reconstruct_text,
};
use proptest::prelude::*;

/// Markdown-heavy alphabet so delimiters actually meet each other.
const MARKDOWN_ALPHABET: &str = "[a-z0-9中文한 ,.!?:;`$~*#>|<()\\[\\]{}^'\"/\\-\\\\\n\t]{0,160}";

/// Prose without Markdown delimiters, so the whole text reaches the rules.
const PROSE_ALPHABET: &str = "[中文ab12 ,.?!:;\"\n]{0,60}";

/// Rules that only run on CJK text, switched off.
fn universal_and_cleanup_only() -> FormattingConfig {
    FormattingConfig {
        fullwidth_alphanumeric: false,
        fullwidth_punctuation: false,
        fullwidth_parentheses: false,
        fullwidth_brackets: false,
        cjk_english_spacing: false,
        cjk_parenthesis_spacing: false,
        currency_spacing: false,
        slash_spacing: false,
        dash_conversion: false,
        emdash_spacing: false,
        smart_quote_conversion: false,
        quote_spacing: false,
        single_quote_spacing: false,
        cjk_corner_quotes: false,
        cjk_nested_quotes: false,
        consecutive_punctuation_limit: PunctuationLimit::Off,
        ..FormattingConfig::all_enabled()
    }
}

proptest! {
    #[test]
    fn regions_and_segments_partition_the_text(text in MARKDOWN_ALPHABET) {
        let chars: Vec<char> = text.chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        let segments = extract_formattable_segments(&chars, &regions);

        let mut spans: Vec<(usize, usize)> = regions
            .iter()
            .map(|r| (r.start, r.end))
            .chain(segments.iter().map(|s| (s.start, s.end)))
            .collect();
        spans.sort_unstable();

        let mut cursor = 0;
        for (start, end) in spans {
            prop_assert_eq!(start, cursor, "gap or overlap in {:?}", text);
            prop_assert!(start < end);
            cursor = end;
        }
        prop_assert_eq!(cursor, chars.len());
    }

    #[test]
    fn untouched_segments_reconstruct_the_input(text in MARKDOWN_ALPHABET) {
        let chars: Vec<char> = text.chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        let segments = extract_formattable_segments(&chars, &regions);
        prop_assert_eq!(reconstruct_text(&chars, &segments, &regions), text);
    }

    #[test]
    fn protected_regions_survive_formatting(text in MARKDOWN_ALPHABET) {
        let chars: Vec<char> = text.chars().collect();
        let output = format_markdown(&text, &FormattingConfig::all_enabled());
        for region in scan_protected_regions(&chars).regions {
            let original: String = chars[region.start..region.end].iter().collect();
            prop_assert!(output.contains(&original), "{:?} lost {:?}", output, original);
        }
    }

    #[test]
    fn latin_text_only_sees_universal_and_cleanup_rules(text in "[ -~\n\t]{0,200}") {
        prop_assert_eq!(
            format_markdown(&text, &FormattingConfig::all_enabled()),
            format_markdown(&text, &universal_and_cleanup_only())
        );
    }

    #[test]
    fn default_formatting_is_idempotent(text in PROSE_ALPHABET) {
        let config = FormattingConfig::default();
        let once = format_markdown(&text, &config);
        let twice = format_markdown(&once, &config);
        prop_assert_eq!(twice, once, "input {:?}", text);
    }

    #[test]
    fn all_enabled_formatting_is_idempotent(text in PROSE_ALPHABET) {
        let config = FormattingConfig::all_enabled();
        let once = format_markdown(&text, &config);
        let twice = format_markdown(&once, &config);
        prop_assert_eq!(twice, once, "input {:?}", text);
    }

    #[test]
    fn arbitrary_unicode_never_panics(text in "\\PC{0,200}") {
        let _ = format_markdown(&text, &FormattingConfig::all_enabled());
        let _ = format_selection(&text, &FormattingConfig::default());
    }
}

const CORPUS: &[&str] = &[
    "你好,世界!",
    "中文English混排,数字123和单位50%。",
    "他说\"你好\"。",
    "使用(API)接口和(中文)说明",
    "等等. . .然后",
    "中文--中文",
    "太棒了！！！！！",
    "价格 $ 100 元",
    "Plain English text... with dots",
    "# 标题\n\n段落一\n\n\n\n段落二  \n下一行",
    "- 列表项一\n- 列表项二\n\n1. 第一\n2. 第二",
    "代码`let x = 1;`和链接[文档](https://x.org)。",
    "---\ntitle: 标题\n---\n\n正文,内容\n",
    "版本v1.2.3发布于10:30,访问example.com查看",
    "中??0",
    "他说\"hello\"然后",
    "\"中\",a",
    "a, \"中\"",
    "first line\nsecond line `code`",
];

#[test]
fn formatting_is_idempotent_on_corpus() {
    for config in [FormattingConfig::default(), FormattingConfig::all_enabled()] {
        for text in CORPUS {
            let once = format_markdown(text, &config);
            let twice = format_markdown(&once, &config);
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }
}

#[test]
fn cjk_gating_on_corpus() {
    for text in CORPUS.iter().filter(|t| !hanfmt_core::contains_cjk(t)) {
        assert_eq!(
            format_markdown(text, &FormattingConfig::all_enabled()),
            format_markdown(text, &universal_and_cleanup_only())
        );
    }
}
