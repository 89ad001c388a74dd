//! Segmentation engine
//!
//! Splits a buffer into top-level units by line, so each unit can be evaluated on its own
//! and its value reported without re-running earlier units or cutting a multi-line
//! construct in half.
//!
//! The engine makes a single left-to-right pass over the tokens, keeping a
//! [`BracketTally`] and a flag noting whether an open bracket was seen since the last
//! unit. For every token:
//!
//! 1. If a unit already ends on the token's line the token is skipped entirely, brackets
//!    included. The first token to close a line wins it.
//! 2. The token's line is scanned once, as raw characters, for its last open bracket.
//!    If that bracket lies after the token's end, a unit cannot end on this token even
//!    if the tally is balanced.
//! 3. Open and close brackets update the tally.
//! 4. If nothing opens later on the line and the tally is balanced, a unit ends on this
//!    line. Its text is every source line from the first through this one.
//!
//! Unbalanced input is not an error: a construct that never closes simply produces no
//! units for its lines, which is what a half-typed buffer needs.

pub mod delimiters;

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

use serde::Serialize;

use crate::playground::error::TokenizeError;
use crate::playground::lexer::{tokenize, Token};
pub use delimiters::{BracketTally, Observed};

/// Unit boundaries found in a buffer: ending line -> source text through that line.
///
/// Iterates in ascending line order. A line holds at most one unit and the first text
/// recorded for it is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnitMap {
    units: BTreeMap<usize, String>,
}

impl UnitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a unit ending on `line`. Returns false, leaving the map untouched, if the
    /// line already has one.
    pub fn record(&mut self, line: usize, text: String) -> bool {
        match self.units.entry(line) {
            Entry::Vacant(entry) => {
                entry.insert(text);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.units.contains_key(&line)
    }

    pub fn get(&self, line: usize) -> Option<&str> {
        self.units.get(&line).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Ending lines, ascending
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.units.keys().copied()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.units.iter(),
        }
    }
}

/// Iterator over `(ending line, unit text)` pairs
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, usize, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(line, text)| (*line, text.as_str()))
    }
}

impl<'a> IntoIterator for &'a UnitMap {
    type Item = (usize, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lines `1..=line` joined with newlines
fn prefix_through<S: AsRef<str>>(lines: &[S], line: usize) -> String {
    let lines = &lines[..line.min(lines.len())];
    let mut text = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
    for (index, content) in lines.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        text.push_str(content.as_ref());
    }
    text
}

/// Find every top-level unit boundary.
///
/// `tokens` and `lines` must come from the same text. Token lines are 1-based; a token
/// whose line is missing from `lines` sees an empty line.
pub fn segment<S: AsRef<str>>(tokens: &[Token], lines: &[S]) -> UnitMap {
    let mut units = UnitMap::new();
    let mut tally = BracketTally::new();
    let mut saw_open_since_last_unit = false;
    // (line, column of its last open bracket); token end lines never decrease
    let mut last_open: Option<(usize, Option<usize>)> = None;

    for token in tokens {
        let line_number = token.end_line();
        if units.contains_line(line_number) {
            continue;
        }

        let line_last_open = match last_open {
            Some((cached, column)) if cached == line_number => column,
            _ => {
                let line_contents = line_number
                    .checked_sub(1)
                    .and_then(|index| lines.get(index))
                    .map(|line| line.as_ref())
                    .unwrap_or("");
                let column = delimiters::last_open_column(line_contents);
                last_open = Some((line_number, column));
                column
            }
        };
        let trailing_open = line_last_open.is_some_and(|last| last >= token.end_column());

        let value = token.value.as_str();
        if (delimiters::is_open(value) || delimiters::is_close(value))
            && tally.observe(value) == Observed::Opened
        {
            saw_open_since_last_unit = true;
        }

        if trailing_open || !tally.is_balanced() {
            continue;
        }

        units.record(line_number, prefix_through(lines, line_number));
        tracing::trace!(
            line = line_number,
            bracketed = saw_open_since_last_unit,
            "unit boundary"
        );
        saw_open_since_last_unit = false;
    }

    units
}

/// Tokenize `source` and segment it
pub fn segment_source(source: &str) -> Result<UnitMap, TokenizeError> {
    let tokens = tokenize(source)?;
    let lines: Vec<&str> = source.split('\n').collect();
    Ok(segment(&tokens, &lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playground::lexer::{Position, TokenKind};

    fn token(value: &str, line: usize, end_column: usize) -> Token {
        let start = end_column.saturating_sub(value.chars().count());
        Token::new(
            TokenKind::Punctuator,
            value,
            Position::new(line, start),
            Position::new(line, end_column),
        )
    }

    fn units(source: &str) -> Vec<(usize, String)> {
        segment_source(source)
            .expect("source should tokenize")
            .iter()
            .map(|(line, text)| (line, text.to_string()))
            .collect()
    }

    #[test]
    fn test_single_statement() {
        assert_eq!(units("1 + 1"), vec![(1, "1 + 1".to_string())]);
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(
            units("1 + 1\n2 + 2"),
            vec![
                (1, "1 + 1".to_string()),
                (2, "1 + 1\n2 + 2".to_string())
            ]
        );
    }

    #[test]
    fn test_multiline_object() {
        let source = "const obj = {\n  a: 1\n};";
        assert_eq!(units(source), vec![(3, source.to_string())]);
    }

    #[test]
    fn test_unclosed_construct_records_nothing() {
        assert!(segment_source("const x = {").unwrap().is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        assert!(segment_source("").unwrap().is_empty());
        assert!(segment_source("   \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_units_before_imbalance_survive() {
        let map = segment_source("a\nb\nfoo(\n1,").unwrap();
        assert_eq!(map.lines().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_trailing_open_defers_unit() {
        // The `}` balances the tally, but a `(` follows on the same line.
        let source = "if (x) {\n} foo(\n1)";
        let map = segment_source(source).unwrap();
        assert_eq!(map.lines().collect::<Vec<_>>(), vec![3]);
        assert_eq!(map.get(3), Some(source));
    }

    #[test]
    fn test_open_bracket_in_trailing_comment_defers_unit() {
        let map = segment_source("x // see [1]\ny").unwrap();
        assert_eq!(map.lines().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_bare_backticks_span_lines() {
        let lines = ["const s = `", "a", "`;"];
        let tokens = vec![
            token("const", 1, 5),
            token("s", 1, 7),
            token("=", 1, 9),
            token("`", 1, 11),
            token("a", 2, 1),
            token("`", 3, 1),
            token(";", 3, 2),
        ];
        let map = segment(&tokens, &lines);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(3), Some("const s = `\na\n`;"));
    }

    #[test]
    fn test_skipped_token_does_not_touch_tally() {
        // `1` closes line 1; the stray `}` after it is never counted, so line 2 still
        // sees a balanced tally.
        let map = segment_source("1 }\n2").unwrap();
        assert_eq!(map.get(1), Some("1 }"));
        assert_eq!(map.get(2), Some("1 }\n2"));
    }

    #[test]
    fn test_first_write_wins() {
        let mut map = UnitMap::new();
        assert!(map.record(1, "first".to_string()));
        assert!(!map.record(1, "second".to_string()));
        assert_eq!(map.get(1), Some("first"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_out_of_range_lines_are_tolerated() {
        let tokens = vec![token("x", 5, 1), token("(", 0, 40)];
        let lines = ["x"];
        let map = segment(&tokens, &lines);
        assert_eq!(map.get(5), Some("x"));
    }

    #[test]
    fn test_units_serialize_as_object() {
        let map = segment_source("a\nb").unwrap();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"1":"a","2":"a\nb"}"#
        );
    }
}
