//! Final whitespace and punctuation cleanup.

use crate::config::FormattingConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static INTERIOR_SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("valid space run regex"));

const LIMITED_PUNCTUATION: &[char] = &['！', '？', '。'];

/// Collapse runs of the same `！`, `？` or `。` to the configured limit.
pub fn limit_repeated_punctuation<'a>(text: &'a str, config: &FormattingConfig) -> Cow<'a, str> {
    let Some(max_run) = config.consecutive_punctuation_limit.max_run() else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;
    let mut changed = false;

    for ch in text.chars() {
        if LIMITED_PUNCTUATION.contains(&ch) && run_char == Some(ch) {
            run_len += 1;
        } else {
            run_char = LIMITED_PUNCTUATION.contains(&ch).then_some(ch);
            run_len = 1;
        }
        if run_char.is_some() && run_len > max_run {
            changed = true;
            continue;
        }
        out.push(ch);
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

/// Split a line into leading whitespace, body and trailing whitespace.
fn split_line(line: &str) -> (&str, &str, &str) {
    let body_start = line.len() - line.trim_start_matches([' ', '\t']).len();
    let body_end = line.trim_end_matches([' ', '\t']).len().max(body_start);
    (
        &line[..body_start],
        &line[body_start..body_end],
        &line[body_end..],
    )
}

/// Collapse interior runs of spaces to one. Indentation and trailing spaces
/// are kept.
pub fn collapse_spaces<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains("  ") {
        return Cow::Borrowed(text);
    }

    let mut changed = false;
    let lines: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(|line| {
            let (lead, body, trail) = split_line(line);
            match INTERIOR_SPACES_RE.replace_all(body, " ") {
                Cow::Borrowed(_) => Cow::Borrowed(line),
                Cow::Owned(collapsed) => {
                    changed = true;
                    Cow::Owned(format!("{lead}{collapsed}{trail}"))
                }
            }
        })
        .collect();

    if !changed {
        return Cow::Borrowed(text);
    }
    Cow::Owned(lines.join("\n"))
}

/// Strip trailing spaces and tabs from every line that ends in a newline.
/// With hard breaks preserved, a content line ending in two or more spaces
/// keeps exactly two.
pub fn remove_trailing_spaces<'a>(text: &'a str, config: &FormattingConfig) -> Cow<'a, str> {
    let Some((terminated, last)) = text.rsplit_once('\n') else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    for line in terminated.split('\n') {
        let content = line.trim_end_matches([' ', '\t']);
        let trail = &line[content.len()..];
        let keep_break = config.preserve_hard_breaks
            && !content.trim().is_empty()
            && trail.chars().filter(|c| *c == ' ').count() >= 2;

        out.push_str(content);
        if keep_break {
            out.push_str("  ");
        }
        out.push('\n');
        let expected = if keep_break { "  " } else { "" };
        changed |= trail != expected;
    }
    out.push_str(last);

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

/// Trailing whitespace and hard-break backslashes at the very end of a
/// document.
pub fn strip_document_end(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_whitespace() || c == '\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PunctuationLimit;

    fn config() -> FormattingConfig {
        FormattingConfig::all_enabled()
    }

    #[test]
    fn limits_repeated_marks() {
        let mut c = config();
        assert_eq!(limit_repeated_punctuation("太棒了！！！！！", &c), "太棒了！！");
        assert_eq!(limit_repeated_punctuation("什么？？？。。。", &c), "什么？？。。");
        c.consecutive_punctuation_limit = PunctuationLimit::One;
        assert_eq!(limit_repeated_punctuation("好！！！吗？？", &c), "好！吗？");
        c.consecutive_punctuation_limit = PunctuationLimit::Off;
        assert!(matches!(
            limit_repeated_punctuation("好！！！！", &c),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn mixed_marks_are_separate_runs() {
        let c = config();
        assert!(matches!(
            limit_repeated_punctuation("真的？！？！", &c),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn collapses_interior_spaces_only() {
        let c = config();
        assert_eq!(
            collapse_spaces("    缩进  保留   \n文字  文字", &c),
            "    缩进 保留   \n文字 文字"
        );
        assert!(matches!(collapse_spaces("a b\n  c", &c), Cow::Borrowed(_)));
    }

    #[test]
    fn trailing_spaces_and_hard_breaks() {
        let mut c = config();
        assert_eq!(
            remove_trailing_spaces("第一行    \n第二行 \n   \n末尾  ", &c),
            "第一行  \n第二行\n\n末尾  "
        );
        c.preserve_hard_breaks = false;
        assert_eq!(
            remove_trailing_spaces("第一行    \n第二行\t\n末尾", &c),
            "第一行\n第二行\n末尾"
        );
    }

    #[test]
    fn strips_document_end() {
        assert_eq!(strip_document_end("文字  \\\n\n"), "文字");
        assert_eq!(strip_document_end("文字"), "文字");
    }
}
