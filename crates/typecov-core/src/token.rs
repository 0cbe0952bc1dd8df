//! Lexical token model shared by the tokenizer and the declaration analyzer

use thiserror::Error;

/// Classification of a lexical token.
///
/// The analyzer only distinguishes the shapes it needs: documentation
/// comments, the `function` keyword, bare identifiers, and single-character
/// punctuation. Variables, literals, operators, and tag markers all land in
/// [`TokenKind::Other`] and are treated as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    /// `//`, `#`, or `/* ... */` comment
    Comment,
    /// `/** ... */` documentation block
    DocComment,
    /// The `function` keyword
    Function,
    /// Bare name: function/class names, modifiers, type names
    Identifier,
    /// Single-character punctuation such as `(`, `)`, `:`, `;`, `{`, `?`, `\`
    Punct(char),
    /// Anything the analyzer treats as opaque
    Other,
}

/// A single lexical token with its source text and 1-indexed line.
///
/// Line numbers are optional: streams produced by an external tokenizer may
/// not carry them, and every consumer tolerates `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line: Some(line),
        }
    }

    /// Whitespace and comments are trivia: they are skipped when looking for
    /// the next significant token inside a declaration context.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }
}

/// The token stream for a file is detectably malformed.
///
/// Raised by the tokenizer for unterminated lexemes, and by the analyzer
/// when a declaration's parameter list never closes before end-of-stream.
/// Propagated per-file; the caller decides whether to skip the file or
/// abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: usize },
    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: usize },
    #[error("parameter list of `{name}` on line {line} never closes")]
    UnbalancedParens { name: String, line: usize },
}
