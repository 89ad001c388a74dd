//! Implementation of the JavaScript tokenizer
//!
//! This module drives the logos lexer, keeps the regular-expression context up to date,
//! and attaches line/column positions to every token.

use logos::Logos;
use serde::Serialize;

use super::location::SourceLocation;
use super::tokens::{RawToken, Slash};
use crate::playground::error::TokenizeError;

/// Token categories, following the classic JavaScript tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    Numeric,
    String,
    Template,
    RegularExpression,
    Boolean,
    Null,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Keyword => TokenKind::Keyword,
            RawToken::Boolean => TokenKind::Boolean,
            RawToken::Null => TokenKind::Null,
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::Numeric => TokenKind::Numeric,
            RawToken::String => TokenKind::String,
            RawToken::Template => TokenKind::Template,
            RawToken::Slash(Slash::RegExp) => TokenKind::RegularExpression,
            RawToken::Slash(Slash::Divide)
            | RawToken::Punctuator
            | RawToken::UnterminatedComment => TokenKind::Punctuator,
        }
    }
}

/// A line/column position. Lines are 1-based, columns 0-based and counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A token of executable source.
///
/// `end` is exclusive: its column is the offset of the first character after the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
        }
    }

    /// Line the token's last character is on
    pub fn end_line(&self) -> usize {
        self.end.line
    }

    pub fn end_column(&self) -> usize {
        self.end.column
    }
}

/// Whether a `/` following this token starts a regular expression
fn regex_allowed_after(kind: TokenKind, value: &str) -> bool {
    match kind {
        TokenKind::Punctuator => !matches!(value, ")" | "]" | "}"),
        TokenKind::Keyword => !matches!(value, "this" | "super"),
        _ => false,
    }
}

/// Tokenize executable source.
///
/// Comments and whitespace produce no tokens. The first lexical error aborts the run.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut location = SourceLocation::new(source);
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let raw = result.map_err(|reason| TokenizeError {
            reason,
            position: location.byte_to_position(span.start),
        })?;

        let kind = TokenKind::from(raw);
        let value = lexer.slice();
        lexer.extras.regex_allowed = regex_allowed_after(kind, value);

        tokens.push(Token::new(
            kind,
            value,
            location.byte_to_position(span.start),
            location.byte_to_position(span.end),
        ));
    }

    tracing::debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}
