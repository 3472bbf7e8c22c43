//! Quote pairing engine.
//!
//! Classifies every quote-like character in a segment, pairs openers with
//! closers on per-type stacks, and rewrites paired glyphs in a single pass.
//! The apostrophe, decade and prime guards run before open/close
//! classification and in that order.

use crate::script::{
    is_cjk_closing_bracket, is_cjk_letter, is_cjk_opening_bracket, is_cjk_terminal_punctuation,
    is_latin_letter,
};
use serde::Serialize;
use std::collections::HashMap;

/// Double or single quote family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteType {
    /// `"` `“` `”`
    Double,
    /// `'` `‘` `’`
    Single,
}

/// Role assigned to a quote-like character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteRole {
    /// Opens a quotation.
    Open,
    /// Closes a quotation.
    Close,
    /// Contraction, possessive or decade abbreviation.
    Apostrophe,
    /// Feet/inches or minutes/seconds mark after a digit.
    Prime,
    /// Whitespace on both sides; never paired.
    Ambiguous,
}

/// A classified quote character. `index` is a codepoint offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuoteToken {
    /// Codepoint offset in the segment.
    pub index: usize,
    /// The character itself.
    pub ch: char,
    /// Quote family.
    pub quote_type: QuoteType,
    /// Assigned role.
    pub role: QuoteRole,
}

/// A matched opener/closer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotePair {
    /// Offset of the opening quote.
    pub open_index: usize,
    /// Offset of the closing quote.
    pub close_index: usize,
    /// Quote family.
    pub quote_type: QuoteType,
    /// Text between the quotes.
    pub content: String,
    /// Content or either outer neighbor is a CJK letter.
    pub is_cjk_involved: bool,
}

/// Output of one pairing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteAnalysis {
    /// Every quote-like character in order.
    pub tokens: Vec<QuoteToken>,
    /// Matched pairs ordered by closing position.
    pub pairs: Vec<QuotePair>,
    /// Offsets of quotes left unpaired.
    pub orphans: Vec<usize>,
}

/// Glyph selection strategy for [`apply_contextual_quotes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteMode {
    /// Leave quotes alone.
    #[default]
    Off,
    /// Curly quotes for every pair.
    CurlyEverywhere,
    /// Curly quotes for CJK-involved pairs; other pairs keep the glyphs they
    /// were written with.
    Contextual,
    /// Corner brackets for CJK-involved pairs; other pairs untouched.
    CornerForCjk,
}

/// Quote family of `ch`, if it is quote-like.
pub fn quote_type(ch: char) -> Option<QuoteType> {
    match ch {
        '"' | '“' | '”' => Some(QuoteType::Double),
        '\'' | '‘' | '’' => Some(QuoteType::Single),
        _ => None,
    }
}

#[derive(Default)]
struct Stacks {
    double: Vec<usize>,
    single: Vec<usize>,
}

impl Stacks {
    fn get_mut(&mut self, quote_type: QuoteType) -> &mut Vec<usize> {
        match quote_type {
            QuoteType::Double => &mut self.double,
            QuoteType::Single => &mut self.single,
        }
    }

    fn has_open(&self, quote_type: QuoteType) -> bool {
        match quote_type {
            QuoteType::Double => !self.double.is_empty(),
            QuoteType::Single => !self.single.is_empty(),
        }
    }
}

/// Classify and pair every quote in `chars`.
pub fn analyze_quotes(chars: &[char]) -> QuoteAnalysis {
    let mut analysis = QuoteAnalysis::default();
    let mut stacks = Stacks::default();

    for (index, &ch) in chars.iter().enumerate() {
        let Some(kind) = quote_type(ch) else {
            continue;
        };
        let role = classify(chars, index, kind, &stacks);
        analysis.tokens.push(QuoteToken {
            index,
            ch,
            quote_type: kind,
            role,
        });

        match role {
            QuoteRole::Open => stacks.get_mut(kind).push(index),
            QuoteRole::Close => match stacks.get_mut(kind).pop() {
                Some(open_index) => {
                    let other = match kind {
                        QuoteType::Double => QuoteType::Single,
                        QuoteType::Single => QuoteType::Double,
                    };
                    let other_stack = stacks.get_mut(other);
                    while other_stack.last().is_some_and(|&i| i > open_index) {
                        if let Some(flushed) = other_stack.pop() {
                            analysis.orphans.push(flushed);
                        }
                    }
                    analysis
                        .pairs
                        .push(make_pair(chars, open_index, index, kind));
                }
                None => analysis.orphans.push(index),
            },
            QuoteRole::Ambiguous => analysis.orphans.push(index),
            QuoteRole::Apostrophe | QuoteRole::Prime => {}
        }
    }

    analysis.orphans.extend(stacks.double);
    analysis.orphans.extend(stacks.single);
    analysis.orphans.sort_unstable();
    analysis
}

fn make_pair(chars: &[char], open_index: usize, close_index: usize, kind: QuoteType) -> QuotePair {
    let content: String = chars[open_index + 1..close_index].iter().collect();
    let before = open_index.checked_sub(1).map(|i| chars[i]);
    let after = chars.get(close_index + 1).copied();
    let is_cjk_involved = content.chars().any(is_cjk_letter)
        || before.is_some_and(is_cjk_letter)
        || after.is_some_and(is_cjk_letter);
    QuotePair {
        open_index,
        close_index,
        quote_type: kind,
        content,
        is_cjk_involved,
    }
}

fn classify(chars: &[char], index: usize, kind: QuoteType, stacks: &Stacks) -> QuoteRole {
    let prev = index.checked_sub(1).map(|i| chars[i]);
    let next = chars.get(index + 1).copied();

    if kind == QuoteType::Single {
        if is_contraction(prev, next) || is_possessive(chars, index, prev) {
            return QuoteRole::Apostrophe;
        }
        if is_decade(chars, index, prev) {
            return QuoteRole::Apostrophe;
        }
        if prev.is_some_and(|c| c.is_ascii_digit()) {
            return QuoteRole::Prime;
        }
    } else if prev.is_some_and(|c| c.is_ascii_digit())
        && (is_feet_inches(chars, index) || !stacks.has_open(QuoteType::Double))
    {
        return QuoteRole::Prime;
    }

    let after_break = prev.is_none_or(char::is_whitespace);
    let before_break = next.is_none_or(char::is_whitespace);
    if after_break && before_break {
        return QuoteRole::Ambiguous;
    }
    if after_break || neighbor_before(chars, index).is_some_and(is_opening_bracket) {
        return QuoteRole::Open;
    }
    if before_break
        || neighbor_after(chars, index)
            .is_some_and(|c| is_closing_bracket(c) || is_cjk_terminal_punctuation(c))
    {
        return QuoteRole::Close;
    }
    if stacks.has_open(kind) {
        return QuoteRole::Close;
    }
    match chars[index] {
        '”' | '’' => QuoteRole::Close,
        _ => QuoteRole::Open,
    }
}

/// letter + `'` + letter
fn is_contraction(prev: Option<char>, next: Option<char>) -> bool {
    prev.is_some_and(is_latin_letter) && next.is_some_and(is_latin_letter)
}

/// letter + `'` + `s` + non-letter
fn is_possessive(chars: &[char], index: usize, prev: Option<char>) -> bool {
    prev.is_some_and(is_latin_letter)
        && chars.get(index + 1) == Some(&'s')
        && !chars.get(index + 2).is_some_and(|c| is_latin_letter(*c))
}

/// `'90`: no digit before, exactly two digits after.
fn is_decade(chars: &[char], index: usize, prev: Option<char>) -> bool {
    !prev.is_some_and(|c| c.is_ascii_digit())
        && chars.get(index + 1).is_some_and(|c| c.is_ascii_digit())
        && chars.get(index + 2).is_some_and(|c| c.is_ascii_digit())
        && !chars.get(index + 3).is_some_and(|c| c.is_ascii_digit())
}

/// `5'10"`: a digit-preceded `'` within four characters before the `"`.
fn is_feet_inches(chars: &[char], index: usize) -> bool {
    (1..=4)
        .filter_map(|back| index.checked_sub(back))
        .any(|i| {
            matches!(chars[i], '\'' | '’' | '′')
                && i.checked_sub(1).is_some_and(|p| chars[p].is_ascii_digit())
        })
}

fn neighbor_before(chars: &[char], index: usize) -> Option<char> {
    chars[..index]
        .iter()
        .rev()
        .find(|c| **c != ' ' && **c != '\t')
        .copied()
}

fn neighbor_after(chars: &[char], index: usize) -> Option<char> {
    chars[index + 1..]
        .iter()
        .find(|c| **c != ' ' && **c != '\t')
        .copied()
}

fn is_opening_bracket(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{' | '<') || is_cjk_opening_bracket(ch)
}

fn is_closing_bracket(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}' | '>') || is_cjk_closing_bracket(ch)
}

fn glyphs(mode: QuoteMode, pair: &QuotePair, original: (char, char)) -> (char, char) {
    match (mode, pair.quote_type, pair.is_cjk_involved) {
        (QuoteMode::Off, _, _) => original,
        (QuoteMode::CurlyEverywhere, QuoteType::Double, _)
        | (QuoteMode::Contextual, QuoteType::Double, true) => ('“', '”'),
        (QuoteMode::CurlyEverywhere, QuoteType::Single, _)
        | (QuoteMode::Contextual, QuoteType::Single, true) => ('‘', '’'),
        (QuoteMode::CornerForCjk, QuoteType::Double, true) => ('「', '」'),
        (QuoteMode::CornerForCjk, QuoteType::Single, true) => ('『', '』'),
        (QuoteMode::Contextual | QuoteMode::CornerForCjk, _, false) => original,
    }
}

/// Rewrite paired quotes in `text` according to `mode`.
///
/// Apostrophes, primes and orphans keep their original glyph. Substitutions
/// are keyed by original index and applied in one left-to-right pass.
pub fn apply_contextual_quotes(text: &str, mode: QuoteMode) -> String {
    if mode == QuoteMode::Off || !text.contains(|c| quote_type(c).is_some()) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let analysis = analyze_quotes(&chars);
    let mut substitutions: HashMap<usize, char> = HashMap::new();
    for pair in &analysis.pairs {
        let original = (chars[pair.open_index], chars[pair.close_index]);
        let (open, close) = glyphs(mode, pair, original);
        substitutions.insert(pair.open_index, open);
        substitutions.insert(pair.close_index, close);
    }

    chars
        .iter()
        .enumerate()
        .map(|(i, ch)| substitutions.get(&i).copied().unwrap_or(*ch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(text: &str) -> Vec<(char, QuoteRole)> {
        let chars: Vec<char> = text.chars().collect();
        analyze_quotes(&chars)
            .tokens
            .iter()
            .map(|t| (t.ch, t.role))
            .collect()
    }

    #[test]
    fn apostrophes_are_not_quotes() {
        assert_eq!(roles("don't"), vec![('\'', QuoteRole::Apostrophe)]);
        assert_eq!(roles("the cat's toy"), vec![('\'', QuoteRole::Apostrophe)]);
        assert_eq!(roles("back in '90 we"), vec![('\'', QuoteRole::Apostrophe)]);
    }

    #[test]
    fn primes_after_digits() {
        assert_eq!(
            roles("he is 5'10\" tall"),
            vec![('\'', QuoteRole::Prime), ('"', QuoteRole::Prime)]
        );
        assert_eq!(roles("a 27\" screen"), vec![('"', QuoteRole::Prime)]);
    }

    #[test]
    fn pairs_nested_quotes() {
        let chars: Vec<char> = "\"她说'你好'\"".chars().collect();
        let analysis = analyze_quotes(&chars);
        assert_eq!(analysis.pairs.len(), 2);
        assert_eq!(analysis.pairs[0].quote_type, QuoteType::Single);
        assert_eq!(analysis.pairs[0].content, "你好");
        assert_eq!(analysis.pairs[1].open_index, 0);
        assert!(analysis.orphans.is_empty());
    }

    #[test]
    fn cjk_terminal_punctuation_closes() {
        let chars: Vec<char> = "他说\"你好\"。".chars().collect();
        let analysis = analyze_quotes(&chars);
        assert_eq!(analysis.pairs.len(), 1);
        assert!(analysis.pairs[0].is_cjk_involved);
    }

    #[test]
    fn mismatched_nesting_flushes_inner_quote() {
        let chars: Vec<char> = "\"a 'b\" c'".chars().collect();
        let analysis = analyze_quotes(&chars);
        assert_eq!(analysis.pairs.len(), 1);
        assert_eq!(analysis.pairs[0].quote_type, QuoteType::Double);
        // inner ' at 3 flushed; trailing ' at 8 has no opener
        assert_eq!(analysis.orphans, vec![3, 8]);
    }

    #[test]
    fn runs_of_quotes_never_panic() {
        let chars: Vec<char> = "\"\"\"\"\"\"\"\"".chars().collect();
        let analysis = analyze_quotes(&chars);
        assert_eq!(analysis.tokens.len(), 8);
    }

    #[test]
    fn contextual_mode() {
        assert_eq!(
            apply_contextual_quotes("他说\"你好\"，她说“hi” and \"ok\"", QuoteMode::Contextual),
            "他说“你好”，她说“hi” and \"ok\""
        );
    }

    #[test]
    fn contextual_mode_leaves_spaced_curly_pairs_alone() {
        let spaced = "他说 “hello” 然后";
        assert_eq!(apply_contextual_quotes(spaced, QuoteMode::Contextual), spaced);
        assert_eq!(
            apply_contextual_quotes("“a” and \"b\"", QuoteMode::Contextual),
            "“a” and \"b\""
        );
    }

    #[test]
    fn digit_before_quote_closes_an_open_pair() {
        let chars: Vec<char> = "他说\"第1\"然后".chars().collect();
        let analysis = analyze_quotes(&chars);
        assert_eq!(analysis.pairs.len(), 1);
        assert_eq!(analysis.pairs[0].content, "第1");
        assert_eq!(
            apply_contextual_quotes("他说\"第1\"然后", QuoteMode::Contextual),
            "他说“第1”然后"
        );
        assert_eq!(roles("第1\"长"), vec![('"', QuoteRole::Prime)]);
    }

    #[test]
    fn curly_everywhere_keeps_apostrophes() {
        assert_eq!(
            apply_contextual_quotes("\"don't\" she said", QuoteMode::CurlyEverywhere),
            "“don't” she said"
        );
    }

    #[test]
    fn corner_mode_for_cjk_pairs_only() {
        assert_eq!(
            apply_contextual_quotes("他说\"她说'好'\"。 \"ok\"", QuoteMode::CornerForCjk),
            "他说「她说『好』」。 \"ok\""
        );
    }

    #[test]
    fn off_mode_is_identity() {
        let text = "\"x\" '你'";
        assert_eq!(apply_contextual_quotes(text, QuoteMode::Off), text);
    }
}
