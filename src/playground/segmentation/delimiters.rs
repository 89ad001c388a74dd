//! Delimiter classification and the per-kind bracket tally
//!
//! The tally is plain bookkeeping: one signed counter per bracket kind, updated token by
//! token. It does not check that a close matches the innermost open; `(` closed by `]`
//! leaves `(` at +1 and `[` at -1, and both stay unbalanced.

/// Symbols that open a bracketed construct
pub const OPEN_DELIMITERS: [&str; 4] = ["(", "{", "[", "`"];

/// Symbols that close a bracketed construct
pub const CLOSE_DELIMITERS: [&str; 4] = [")", "}", "]", "`"];

/// The template literal boundary, which both opens and closes
pub const TEMPLATE_DELIMITER: &str = "`";

pub fn is_open(value: &str) -> bool {
    OPEN_DELIMITERS.contains(&value)
}

pub fn is_close(value: &str) -> bool {
    CLOSE_DELIMITERS.contains(&value)
}

/// The open symbol a close symbol balances. The backtick maps to itself.
pub fn matching_open(close: &str) -> Option<&'static str> {
    match close {
        ")" => Some("("),
        "}" => Some("{"),
        "]" => Some("["),
        "`" => Some("`"),
        _ => None,
    }
}

/// Character index of the last open symbol in `line`, if it has one.
///
/// A token ending at column `c` has an open bracket after it exactly when this is at
/// least `c`. The scan is over raw characters, not tokens, so an open bracket inside a
/// string or a comment later on the line counts too.
pub fn last_open_column(line: &str) -> Option<usize> {
    line.chars()
        .enumerate()
        .filter(|(_, ch)| is_open(ch.encode_utf8(&mut [0; 4])))
        .map(|(column, _)| column)
        .last()
}

/// What observing a token did to the tally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Opened,
    Closed,
    Ignored,
}

/// Count of currently unmatched opens, per bracket kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketTally {
    counts: [isize; OPEN_DELIMITERS.len()],
}

impl BracketTally {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(open: &str) -> Option<usize> {
        OPEN_DELIMITERS.iter().position(|candidate| *candidate == open)
    }

    /// Update the tally for one token value.
    ///
    /// A backtick opens when no template is pending and closes the pending one otherwise,
    /// so a template literal's two backticks net to zero.
    pub fn observe(&mut self, value: &str) -> Observed {
        if value == TEMPLATE_DELIMITER {
            let Some(slot) = Self::slot(TEMPLATE_DELIMITER) else {
                return Observed::Ignored;
            };
            return if self.counts[slot] == 0 {
                self.counts[slot] += 1;
                Observed::Opened
            } else {
                self.counts[slot] -= 1;
                Observed::Closed
            };
        }

        if let Some(slot) = Self::slot(value) {
            self.counts[slot] += 1;
            return Observed::Opened;
        }

        match matching_open(value).and_then(Self::slot) {
            Some(slot) => {
                self.counts[slot] -= 1;
                Observed::Closed
            }
            None => Observed::Ignored,
        }
    }

    /// Every kind's count is exactly zero
    pub fn is_balanced(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    #[cfg(test)]
    fn count(&self, open: &str) -> Option<isize> {
        Self::slot(open).map(|slot| self.counts[slot])
    }
}
