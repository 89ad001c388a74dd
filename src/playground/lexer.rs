//! Lexer module for executable JavaScript
//!
//! This module contains the tokenization logic: the raw logos token definitions, the
//! tokenizer that attaches positions to them, and the byte offset to line/column mapping.
//!
//! Tokens mirror what a classic JavaScript tokenizer reports: comments are dropped, each
//! bracket is its own punctuator, and a template literal (substitutions included) is a
//! single token ending on the line of its closing backtick. That last point matters to
//! segmentation: a template spanning several lines has no token ending on its inner
//! lines, so no unit boundary can be found there.

pub mod lexer_impl;
pub mod location;
pub mod tokens;

pub use lexer_impl::{tokenize, Position, Token, TokenKind};
pub use location::SourceLocation;
pub use tokens::LexErrorKind;
