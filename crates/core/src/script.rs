//! Character-class predicates for CJK and Latin text.
//!
//! Hangul is deliberately kept apart from [`is_cjk_letter`]: Korean prose uses
//! Western punctuation, so it must not trigger fullwidth punctuation or bracket
//! conversion. It still counts for [`contains_cjk`] and for CJK↔Latin spacing.

/// Han ideographs, including the supplementary planes (Extension B–G).
#[inline]
pub fn is_han(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'   // Extension A
        | '\u{F900}'..='\u{FAFF}'   // Compatibility Ideographs
        | '\u{20000}'..='\u{2A6DF}' // Extension B
        | '\u{2A700}'..='\u{2EBEF}' // Extensions C–F
        | '\u{30000}'..='\u{3134F}' // Extension G
    )
}

/// Hiragana block.
#[inline]
pub fn is_hiragana(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{309F}')
}

/// Katakana plus the phonetic extensions block.
#[inline]
pub fn is_katakana(ch: char) -> bool {
    matches!(ch, '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}')
}

/// Bopomofo plus Bopomofo Extended.
#[inline]
pub fn is_bopomofo(ch: char) -> bool {
    matches!(ch, '\u{3100}'..='\u{312F}' | '\u{31A0}'..='\u{31BF}')
}

/// Hangul syllables, jamo and compatibility jamo.
#[inline]
pub fn is_hangul(ch: char) -> bool {
    matches!(ch,
        '\u{AC00}'..='\u{D7AF}'
        | '\u{1100}'..='\u{11FF}'
        | '\u{3130}'..='\u{318F}'
    )
}

/// Returns true for Han, Hiragana, Katakana and Bopomofo. Hangul is excluded.
#[inline]
pub fn is_cjk_letter(ch: char) -> bool {
    is_han(ch) || is_hiragana(ch) || is_katakana(ch) || is_bopomofo(ch)
}

/// CJK letters plus Hangul; the class used for CJK↔Latin spacing.
#[inline]
pub fn is_cjk_or_hangul(ch: char) -> bool {
    is_cjk_letter(ch) || is_hangul(ch)
}

/// Document-level CJK presence check. Short-circuits on the first match.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk_or_hangul)
}

/// Fullwidth sentence and clause punctuation.
pub const CJK_TERMINAL_PUNCTUATION: &[char] = &[
    '，', '。', '！', '？', '；', '：', '、', '…',
];

/// Opening CJK brackets and corner quotes.
pub const CJK_OPENING_BRACKETS: &[char] = &[
    '（', '［', '｛', '【', '「', '『', '《', '〈', '〔', '〖',
];

/// Closing CJK brackets and corner quotes.
pub const CJK_CLOSING_BRACKETS: &[char] = &[
    '）', '］', '｝', '】', '」', '』', '》', '〉', '〕', '〗',
];

/// ASCII punctuation that may be promoted to its fullwidth form.
const FULLWIDTH_PUNCTUATION: &[(char, char)] = &[
    (',', '，'),
    ('.', '。'),
    ('!', '！'),
    ('?', '？'),
    (';', '；'),
    (':', '：'),
];

/// Member of [`CJK_TERMINAL_PUNCTUATION`].
#[inline]
pub fn is_cjk_terminal_punctuation(ch: char) -> bool {
    CJK_TERMINAL_PUNCTUATION.contains(&ch)
}

/// Member of [`CJK_OPENING_BRACKETS`].
#[inline]
pub fn is_cjk_opening_bracket(ch: char) -> bool {
    CJK_OPENING_BRACKETS.contains(&ch)
}

/// Member of [`CJK_CLOSING_BRACKETS`].
#[inline]
pub fn is_cjk_closing_bracket(ch: char) -> bool {
    CJK_CLOSING_BRACKETS.contains(&ch)
}

/// Maps `, . ! ? ; :` to their fullwidth counterparts.
pub fn fullwidth_punctuation(ch: char) -> Option<char> {
    FULLWIDTH_PUNCTUATION
        .iter()
        .find(|(half, _)| *half == ch)
        .map(|(_, full)| *full)
}

/// Fullwidth digits and Latin letters (U+FF10–FF19, U+FF21–FF3A, U+FF41–FF5A).
#[inline]
pub fn is_fullwidth_alphanumeric(ch: char) -> bool {
    matches!(ch, '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ')
}

/// Converts a fullwidth alphanumeric to ASCII via the fixed `0xFEE0` offset.
pub fn to_halfwidth(ch: char) -> char {
    if is_fullwidth_alphanumeric(ch) {
        char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch)
    } else {
        ch
    }
}

/// ASCII punctuation that can appear inside a Latin span.
const LATIN_SPAN_PUNCTUATION: &str = ".,!?;:'\"()[]{}<>/-_@#&=+*%$\\|~^`";

/// Characters that extend a Latin span. Newlines never do.
#[inline]
pub fn is_latin_span_char(ch: char) -> bool {
    if ch == '\n' || ch == '\r' || is_cjk_letter(ch) {
        return false;
    }
    ch.is_ascii_alphanumeric() || ch.is_whitespace() || LATIN_SPAN_PUNCTUATION.contains(ch)
}

/// Letters outside the CJK/Hangul scripts, used by the quote heuristics.
#[inline]
pub fn is_latin_letter(ch: char) -> bool {
    ch.is_alphabetic() && !is_cjk_or_hangul(ch)
}
