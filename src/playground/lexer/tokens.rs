//! Raw token definitions for executable JavaScript
//!
//! The tokens are defined using the logos derive macro. Almost everything is a plain
//! `#[token]` or `#[regex]` rule; the three constructs a regular grammar cannot express
//! (template literals with substitutions, regular expression literals, and the choice
//! between a regular expression and a division) are matched on their first character and
//! finished by a callback that scans the remainder by hand.
use logos::{Lexer, Logos};

/// Reasons the raw lexer can reject input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[default]
    #[error("Unexpected token ILLEGAL")]
    UnexpectedCharacter,
    #[error("Unterminated template literal")]
    UnterminatedTemplate,
    #[error("Invalid regular expression: missing /")]
    UnterminatedRegExp,
    #[error("Unterminated comment")]
    UnterminatedComment,
}

/// State carried between tokens.
///
/// `regex_allowed` is maintained by the tokenizer loop: it is true wherever an expression
/// may start, which is exactly where a `/` opens a regular expression literal.
#[derive(Debug, Clone)]
pub struct LexState {
    pub regex_allowed: bool,
}

impl Default for LexState {
    fn default() -> Self {
        Self {
            regex_allowed: true,
        }
    }
}

/// What a `/` or `/=` turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slash {
    Divide,
    RegExp,
}

/// All raw tokens produced by the logos lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = LexState)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\n\r\f\v\u{a0}\u{feff}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}]+")]
#[logos(skip r"//[^\n\r]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum RawToken {
    // A terminated block comment is skipped above, so reaching this rule means the
    // comment never closes.
    #[token("/*", unterminated_comment)]
    UnterminatedComment,

    #[token("break")]
    #[token("case")]
    #[token("catch")]
    #[token("class")]
    #[token("const")]
    #[token("continue")]
    #[token("debugger")]
    #[token("default")]
    #[token("delete")]
    #[token("do")]
    #[token("else")]
    #[token("export")]
    #[token("extends")]
    #[token("finally")]
    #[token("for")]
    #[token("function")]
    #[token("if")]
    #[token("import")]
    #[token("in")]
    #[token("instanceof")]
    #[token("new")]
    #[token("return")]
    #[token("super")]
    #[token("switch")]
    #[token("this")]
    #[token("throw")]
    #[token("try")]
    #[token("typeof")]
    #[token("var")]
    #[token("void")]
    #[token("while")]
    #[token("with")]
    #[token("yield")]
    #[token("let")]
    #[token("await")]
    Keyword,

    #[token("true")]
    #[token("false")]
    Boolean,

    #[token("null")]
    Null,

    // Any non-ASCII character that is not Unicode whitespace
    #[regex(r"#?[A-Za-z_$\u{80}-\u{9f}\u{a1}-\u{167f}\u{1681}-\u{1fff}\u{200b}-\u{2027}\u{202a}-\u{202e}\u{2030}-\u{205e}\u{2060}-\u{2fff}\u{3001}-\u{fefe}\u{ff00}-\u{10FFFF}][A-Za-z0-9_$\u{80}-\u{9f}\u{a1}-\u{167f}\u{1681}-\u{1fff}\u{200b}-\u{2027}\u{202a}-\u{202e}\u{2030}-\u{205e}\u{2060}-\u{2fff}\u{3001}-\u{fefe}\u{ff00}-\u{10FFFF}]*")]
    Identifier,

    #[regex(r"(0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?)n?")]
    Numeric,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n]|\\\r?\n)*""#)]
    #[regex(r"'([^'\\\r\n]|\\[^\r\n]|\\\r?\n)*'")]
    String,

    #[token("`", template)]
    Template,

    #[token("/", slash)]
    #[token("/=", slash)]
    Slash(Slash),

    // Brackets
    #[token("(")]
    #[token(")")]
    #[token("{")]
    #[token("}")]
    #[token("[")]
    #[token("]")]
    // Separators
    #[token(";")]
    #[token(",")]
    #[token(".")]
    #[token("...")]
    #[token("?.")]
    #[token("?")]
    #[token(":")]
    #[token("=>")]
    // Operators
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("==")]
    #[token("!=")]
    #[token("===")]
    #[token("!==")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("%")]
    #[token("**")]
    #[token("++")]
    #[token("--")]
    #[token("<<")]
    #[token(">>")]
    #[token(">>>")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("!")]
    #[token("~")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    // Assignment
    #[token("=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("%=")]
    #[token("**=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token(">>>=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("&&=")]
    #[token("||=")]
    #[token("??=")]
    Punctuator,
}

fn unterminated_comment(_: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::UnterminatedComment)
}

/// Finishes a template literal whose opening backtick has just been matched
fn template(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    let consumed = scan_template(lex.remainder().as_bytes())?;
    lex.bump(consumed);
    Ok(())
}

/// Decides between division and a regular expression literal
fn slash(lex: &mut Lexer<RawToken>) -> Result<Slash, LexErrorKind> {
    if !lex.extras.regex_allowed {
        return Ok(Slash::Divide);
    }
    // For `/=` the `=` already belongs to the pattern body.
    let consumed = scan_regex(lex.remainder().as_bytes())?;
    lex.bump(consumed);
    Ok(Slash::RegExp)
}

// The scanners below work on bytes: every delimiter they look for is ASCII, and UTF-8
// continuation bytes never collide with ASCII, so multi-byte characters are stepped over
// one byte at a time. Returned lengths always end just after an ASCII byte.

/// Bytes up to and including the closing backtick
pub(crate) fn scan_template(rest: &[u8]) -> Result<usize, LexErrorKind> {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'`' => return Ok(i + 1),
            b'$' if rest.get(i + 1) == Some(&b'{') => {
                i += 2 + scan_substitution(&rest[i + 2..])?;
            }
            _ => i += 1,
        }
    }
    Err(LexErrorKind::UnterminatedTemplate)
}

/// Bytes up to and including the `}` that closes a `${` substitution
fn scan_substitution(rest: &[u8]) -> Result<usize, LexErrorKind> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Ok(i + 1),
            b'}' => depth -= 1,
            b'`' => {
                i += 1 + scan_template(&rest[i + 1..])?;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i += 1 + scan_quoted(&rest[i + 1..], quote)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    Err(LexErrorKind::UnterminatedTemplate)
}

/// Bytes up to and including the closing quote of a string inside a substitution
fn scan_quoted(rest: &[u8], quote: u8) -> Result<usize, LexErrorKind> {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' | b'\r' => break,
            c if c == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(LexErrorKind::UnterminatedTemplate)
}

/// Bytes of a regular expression body, closing slash and flags
pub(crate) fn scan_regex(rest: &[u8]) -> Result<usize, LexErrorKind> {
    let mut in_class = false;
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' | b'\r' => break,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < rest.len() && (rest[i].is_ascii_alphanumeric() || rest[i] == b'_') {
                    i += 1;
                }
                return Ok(i);
            }
            _ => i += 1,
        }
    }
    Err(LexErrorKind::UnterminatedRegExp)
}
