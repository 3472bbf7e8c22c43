use serde::Serialize;
use thiserror::Error;

/// Source location information for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in codepoints (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Resolve a codepoint offset inside `chars` to a line/column pair.
    pub fn from_offset(chars: &[char], offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for &ch in chars.iter().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while building a formatting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Consecutive punctuation limit outside `0..=2`.
    #[error("consecutive punctuation limit must be 0, 1 or 2, got {0}")]
    InvalidPunctuationLimit(u8),
    /// Configuration JSON failed to parse.
    #[error("invalid configuration JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Non-fatal findings; the formatter degrades instead of failing on these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Code fence opened but never closed; its content is formatted as prose.
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Leading `---` with no closing line; not treated as frontmatter.
    UnterminatedFrontmatter {
        /// Source location of the opening fence
        location: SourceLocation,
    },
    /// Quote with no partner; it is left unconverted.
    OrphanQuote {
        /// Source location of the quote
        location: SourceLocation,
        /// The quote character
        quote: char,
    },
}

impl Diagnostic {
    /// Get the location of this diagnostic
    pub fn location(&self) -> &SourceLocation {
        match self {
            Diagnostic::UnclosedCodeFence { location, .. } => location,
            Diagnostic::UnterminatedFrontmatter { location } => location,
            Diagnostic::OrphanQuote { location, .. } => location,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnclosedCodeFence { location, marker } => {
                write!(f, "{}: unclosed code fence ({})", location, marker)
            }
            Diagnostic::UnterminatedFrontmatter { location } => {
                write!(f, "{}: unterminated frontmatter block", location)
            }
            Diagnostic::OrphanQuote { location, quote } => {
                write!(f, "{}: unpaired quote {}", location, quote)
            }
        }
    }
}

/// Collection of diagnostics gathered during a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Findings in document order
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Sort findings by location
    pub fn sort(&mut self) {
        self.items
            .sort_by_key(|d| (d.location().line, d.location().column));
    }

    /// Check if there are any diagnostics
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_resolve_to_line_and_column() {
        let chars: Vec<char> = "ab\n中文\"x".chars().collect();
        assert_eq!(SourceLocation::from_offset(&chars, 0), SourceLocation::new(1, 1));
        assert_eq!(SourceLocation::from_offset(&chars, 3), SourceLocation::new(2, 1));
        assert_eq!(SourceLocation::from_offset(&chars, 5), SourceLocation::new(2, 3));
    }

    #[test]
    fn diagnostics_sort_and_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::OrphanQuote {
            location: SourceLocation::new(3, 2),
            quote: '"',
        });
        diagnostics.push(Diagnostic::UnclosedCodeFence {
            location: SourceLocation::new(1, 1),
            marker: '`',
        });
        diagnostics.sort();
        assert_eq!(diagnostics.count(), 2);
        assert_eq!(diagnostics.items[0].to_string(), "1:1: unclosed code fence (`)");
        assert_eq!(diagnostics.items[1].to_string(), "3:2: unpaired quote \"");
    }

    #[test]
    fn config_error_messages() {
        let err = ConfigError::InvalidPunctuationLimit(7);
        assert_eq!(
            err.to_string(),
            "consecutive punctuation limit must be 0, 1 or 2, got 7"
        );
    }
}
