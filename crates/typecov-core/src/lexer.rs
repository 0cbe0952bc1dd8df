//! Lexical scanner for PHP source files
//!
//! Produces the token stream consumed by the declaration analyzer. This is
//! not a full PHP lexer: it classifies exactly what the analyzer needs
//! (comments, the `function` keyword, identifiers, punctuation) and leaves
//! everything else opaque. Heredoc bodies get no special treatment.

use crate::token::{Token, TokenKind, TokenizationError};

/// Tokenize PHP source into a classified token stream.
///
/// Text outside `<?php ... ?>` tags is emitted as single opaque chunks, so
/// templates with leading or interleaved markup still tokenize.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizationError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizationError> {
        loop {
            self.inline_html();
            if self.at_end() {
                break;
            }
            self.open_tag();
            self.php_block()?;
        }
        Ok(self.tokens)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        c
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        let text: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token {
            kind,
            text,
            line: Some(line),
        });
    }

    /// Everything up to the next `<?` is opaque inline output.
    fn inline_html(&mut self) {
        let start = self.pos;
        let line = self.line;
        while !self.at_end() {
            if self.peek() == Some('<') && self.peek_at(1) == Some('?') {
                break;
            }
            self.advance();
        }
        if self.pos > start {
            self.push(TokenKind::Other, start, line);
        }
    }

    /// Consume `<?php`, `<?=`, or bare `<?`.
    fn open_tag(&mut self) {
        let start = self.pos;
        let line = self.line;
        self.advance();
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
        } else {
            let tag: String = self.chars[self.pos..].iter().take(3).collect();
            if tag.eq_ignore_ascii_case("php") {
                for _ in 0..3 {
                    self.advance();
                }
            }
        }
        self.push(TokenKind::Other, start, line);
    }

    fn php_block(&mut self) -> Result<(), TokenizationError> {
        while !self.at_end() {
            // `?>` drops back to inline output
            if self.peek() == Some('?') && self.peek_at(1) == Some('>') {
                let start = self.pos;
                let line = self.line;
                self.advance();
                self.advance();
                self.push(TokenKind::Other, start, line);
                return Ok(());
            }
            self.php_token()?;
        }
        Ok(())
    }

    fn php_token(&mut self) -> Result<(), TokenizationError> {
        let start = self.pos;
        let line = self.line;
        let c = self.peek().expect("php_token called at end of input");

        if c.is_whitespace() {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.advance();
            }
            self.push(TokenKind::Whitespace, start, line);
        } else if (c == '/' && self.peek_at(1) == Some('/')) || c == '#' {
            self.line_comment(start, line);
        } else if c == '/' && self.peek_at(1) == Some('*') {
            self.block_comment(start, line)?;
        } else if c == '\'' || c == '"' || c == '`' {
            self.string_literal(c, line)?;
            self.push(TokenKind::Other, start, line);
        } else if c == '$' {
            self.advance();
            while self.peek().is_some_and(is_ident_char) {
                self.advance();
            }
            self.push(TokenKind::Other, start, line);
        } else if is_ident_start(c) {
            while self.peek().is_some_and(is_ident_char) {
                self.advance();
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            let kind = if text.eq_ignore_ascii_case("function") {
                TokenKind::Function
            } else {
                TokenKind::Identifier
            };
            self.tokens.push(Token {
                kind,
                text,
                line: Some(line),
            });
        } else if c.is_ascii_digit() {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            {
                self.advance();
            }
            self.push(TokenKind::Other, start, line);
        } else if is_punct(c) {
            self.advance();
            self.push(TokenKind::Punct(c), start, line);
        } else {
            self.advance();
            self.push(TokenKind::Other, start, line);
        }
        Ok(())
    }

    /// `//` or `#` comment, ending at the newline or a closing tag.
    fn line_comment(&mut self, start: usize, line: usize) {
        while let Some(c) = self.peek() {
            if c == '\n' || (c == '?' && self.peek_at(1) == Some('>')) {
                break;
            }
            self.advance();
        }
        self.push(TokenKind::Comment, start, line);
    }

    fn block_comment(&mut self, start: usize, line: usize) -> Result<(), TokenizationError> {
        self.advance();
        self.advance();
        loop {
            if self.at_end() {
                return Err(TokenizationError::UnterminatedComment { line });
            }
            if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        // `/**/` is an empty plain comment, not a doc block
        let kind = if text.starts_with("/**") && text.chars().count() > 4 {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.tokens.push(Token {
            kind,
            text,
            line: Some(line),
        });
        Ok(())
    }

    fn string_literal(&mut self, quote: char, line: usize) -> Result<(), TokenizationError> {
        self.advance();
        loop {
            match self.peek() {
                None => return Err(TokenizationError::UnterminatedString { line }),
                Some('\\') => {
                    self.advance();
                    if !self.at_end() {
                        self.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Punctuation the analyzer distinguishes; other symbols stay opaque.
fn is_punct(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '{' | '}' | '[' | ']' | ':' | ';' | ',' | '?' | '\\' | '=' | '&'
    )
}
