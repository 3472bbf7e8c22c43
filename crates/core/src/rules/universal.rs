//! Rules applied to every segment, CJK or not.

use crate::config::FormattingConfig;
use crate::script::is_cjk_or_hangul;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static ELLIPSIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:[ \t]*\.){2,}([ \t]*)").expect("valid ellipsis regex"));

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("valid blank line regex"));

static EMPTY_BREAK_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*<br[ \t]*/?>[ \t]*\n").expect("valid empty break regex")
});

/// `. . .` and runs of three or more dots become `...`. A following word gets
/// exactly one space; a line end gets none. Other spacing is kept.
pub fn normalize_ellipsis<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains("..") && !text.contains(". .") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for caps in ELLIPSIS_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let next = text[whole.end()..].chars().next();
        let spacing = if next.is_some_and(|c| c.is_alphanumeric() || is_cjk_or_hangul(c)) {
            " "
        } else if next.is_some_and(|c| c == '\n' || c == '\r') {
            ""
        } else {
            caps.get(1).map_or("", |m| m.as_str())
        };
        if whole.as_str().len() != 3 + spacing.len() || !whole.as_str().starts_with("...") {
            changed = true;
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str("...");
        out.push_str(spacing);
        last = whole.end();
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Three or more newlines become one blank line; lines holding only `<br>`
/// are dropped first.
///
/// In a document `<br>` is an HTML region and never reaches this rule, so
/// the break removal only applies to [`format_selection`] input.
///
/// [`format_selection`]: crate::format_selection
pub fn collapse_newlines<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    let without_breaks = EMPTY_BREAK_LINE_RE.replace_all(text, "");
    if !BLANK_LINES_RE.is_match(&without_breaks) {
        return without_breaks;
    }
    Cow::Owned(
        BLANK_LINES_RE
            .replace_all(&without_breaks, "\n\n")
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipsis(text: &str) -> String {
        normalize_ellipsis(text, &FormattingConfig::default()).into_owned()
    }

    fn newlines(text: &str) -> String {
        collapse_newlines(text, &FormattingConfig::default()).into_owned()
    }

    #[test]
    fn spaced_dots_become_ellipsis() {
        assert_eq!(ellipsis("等等. . .然后"), "等等... 然后");
        assert_eq!(ellipsis("wait.....what"), "wait... what");
        assert_eq!(ellipsis("wait...    what"), "wait... what");
    }

    #[test]
    fn ellipsis_at_line_end_gets_no_space() {
        assert_eq!(ellipsis("to be continued. . .\nnext"), "to be continued...\nnext");
        assert_eq!(ellipsis("end. . .  \n"), "end...\n");
    }

    #[test]
    fn two_dots_are_left_alone() {
        assert!(matches!(
            normalize_ellipsis("cd ../src", &FormattingConfig::default()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn normalized_ellipsis_is_borrowed() {
        assert!(matches!(
            normalize_ellipsis("so... yes", &FormattingConfig::default()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(newlines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(newlines("a\n  \n\t\n\nb"), "a\n\nb");
        assert_eq!(newlines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn drops_empty_break_lines() {
        assert_eq!(newlines("a\n\n<br/>\n\nb"), "a\n\nb");
        assert_eq!(newlines("a\n<br />\nb"), "a\nb");
    }
}
