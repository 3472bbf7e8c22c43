//! Technical-subspan detection inside Latin spans.
//!
//! Recognizes URLs, emails, versions, times, grouped numbers, domains and
//! decimals so the punctuation rules never rewrite machine-meaningful text.
//! Kinds are matched in a fixed priority order; a candidate that overlaps an
//! already accepted match is dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Kind of a technical subspan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TechnicalKind {
    /// `https://…`, `ftp://…`, `www.…`
    UrlLike,
    /// `name@host.tld`
    EmailLike,
    /// `example.com`, `Node.js`
    DomainLike,
    /// `1.2.3`, `v2.0`
    VersionLike,
    /// `3.14`
    DecimalLike,
    /// `10:30`, `23:59:59`
    TimeLike,
    /// `1,000,000`
    ThousandsLike,
}

/// A recognized technical token. Offsets are codepoint indices relative to the
/// enclosing Latin span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalSubspan {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Detected kind.
    pub kind: TechnicalKind,
    /// Matched text.
    pub text: String,
}

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?|ftp)://[^\s<>]+|\bwww\.[^\s<>]+").expect("url pattern compiles")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("email pattern compiles")
});

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[vV]?\d+(?:\.\d+){2,}(?:-[0-9A-Za-z]+(?:\.[0-9A-Za-z]+)*)?|\b[vV]\d+\.\d+\b")
        .expect("version pattern compiles")
});

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}:\d{2}(?::\d{2})?\b").expect("time pattern compiles"));

static THOUSANDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,3}(?:,\d{3})+(?:\.\d+)?\b").expect("thousands pattern compiles")
});

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}\b")
        .expect("domain pattern compiles")
});

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\d+\b").expect("decimal pattern compiles"));

/// Punctuation that ends a sentence rather than a URL.
const URL_TRAILING: &[char] = &['.', ',', '!', '?', ';', ':', ')', ']', '}', '\'', '"'];

/// Patterns in priority order. Earlier kinds win overlaps.
fn patterns() -> [(TechnicalKind, &'static Regex); 7] {
    [
        (TechnicalKind::UrlLike, &URL_RE),
        (TechnicalKind::EmailLike, &EMAIL_RE),
        (TechnicalKind::VersionLike, &VERSION_RE),
        (TechnicalKind::TimeLike, &TIME_RE),
        (TechnicalKind::ThousandsLike, &THOUSANDS_RE),
        (TechnicalKind::DomainLike, &DOMAIN_RE),
        (TechnicalKind::DecimalLike, &DECIMAL_RE),
    ]
}

/// Finds every technical subspan in `text`, sorted by start offset.
pub fn find_technical_subspans(text: &str) -> Vec<TechnicalSubspan> {
    let mut accepted: Vec<(usize, usize, TechnicalKind)> = Vec::new();

    for (kind, re) in patterns() {
        for m in re.find_iter(text) {
            let mut end = m.end();
            if kind == TechnicalKind::UrlLike {
                end = m.start() + m.as_str().trim_end_matches(URL_TRAILING).len();
            }
            let start = m.start();
            if start >= end {
                continue;
            }
            let overlaps = accepted.iter().any(|&(s, e, _)| start < e && s < end);
            if !overlaps {
                accepted.push((start, end, kind));
            }
        }
    }

    accepted.sort_by_key(|&(start, _, _)| start);
    accepted
        .into_iter()
        .map(|(start, end, kind)| TechnicalSubspan {
            start: char_offset(text, start),
            end: char_offset(text, end),
            kind,
            text: text[start..end].to_string(),
        })
        .collect()
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
