//! Read-only gate for model-written SQL.
//!
//! A statement passes when, after skipping whitespace and comments, its first
//! keyword is `SELECT` and nothing but whitespace, comments or `;` follows the
//! first statement terminator. String literals, quoted identifiers and
//! comments are masked before any keyword is looked at, so `'DROP; x'` inside
//! a literal neither trips nor hides anything.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

static LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blimit\b").expect("Static regex is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("Empty query")]
    Empty,

    #[error("Only a single SELECT statement is allowed; found multiple statements")]
    MultipleStatements,

    #[error("Only SELECT statements are allowed (read-only mode); got {0}")]
    Disallowed(String),
}

/// A statement that passed [`SelectStatement::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    sql: String,
    masked: String,
    unterminated: bool,
}

impl SelectStatement {
    pub fn parse(sql: &str) -> Result<Self, StatementError> {
        let (masked, end_state) = mask(sql);

        let keyword = leading_keyword(&masked).ok_or(StatementError::Empty)?;
        if !keyword.eq_ignore_ascii_case("select") {
            return Err(StatementError::Disallowed(keyword.to_uppercase()));
        }

        if let Some(terminator) = masked.find(';') {
            let rest = &masked[terminator..];
            if rest.chars().any(|c| c != ';' && !c.is_whitespace()) {
                return Err(StatementError::MultipleStatements);
            }
        }

        Ok(Self {
            sql: sql.to_string(),
            masked,
            unterminated: matches!(end_state, State::Quoted(_)),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Whether a `LIMIT` keyword appears outside literals and comments.
    pub fn has_limit(&self) -> bool {
        LIMIT_RE.is_match(&self.masked)
    }

    /// The SQL to execute: untouched when a `LIMIT` is present or a literal is
    /// left open, otherwise `LIMIT row_limit` appended after dropping any
    /// trailing `;`, whitespace and comments.
    pub fn with_row_limit(&self, row_limit: usize) -> String {
        if self.has_limit() || self.unterminated {
            return self.sql.clone();
        }

        let end = self
            .masked
            .char_indices()
            .filter(|(_, c)| *c != ';' && !c.is_whitespace())
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        format!("{} LIMIT {row_limit}", &self.sql[..end])
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

fn leading_keyword(masked: &str) -> Option<&str> {
    let trimmed = masked.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    if end == 0 {
        // Starts with punctuation such as `(`; report the first token.
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        return Some(&trimmed[..end]);
    }
    Some(&trimmed[..end])
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Replaces comments entirely, and the contents of string literals and quoted
/// identifiers, with spaces. Byte offsets are preserved, so positions found in
/// the mask index the original text. Also returns the state at end of input.
fn mask(sql: &str) -> (String, State) {
    let mut masked = String::with_capacity(sql.len());
    let mut state = State::Code;
    let mut chars = sql.chars().peekable();

    let blank = |masked: &mut String, c: char| {
        masked.extend(std::iter::repeat(' ').take(c.len_utf8()));
    };

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '\'' | '"' | '`' => {
                    state = State::Quoted(c);
                    masked.push(c);
                }
                '[' => {
                    state = State::Quoted(']');
                    masked.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                    masked.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    masked.push_str("  ");
                }
                _ => masked.push(c),
            },
            State::Quoted(close) => {
                if c == close {
                    // A doubled quote is an escaped quote, not the end.
                    if close != ']' && chars.peek() == Some(&close) {
                        chars.next();
                        masked.push_str("  ");
                    } else {
                        state = State::Code;
                        masked.push(c);
                    }
                } else {
                    blank(&mut masked, c);
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    masked.push(c);
                } else {
                    blank(&mut masked, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    masked.push_str("  ");
                } else {
                    blank(&mut masked, c);
                }
            }
        }
    }

    (masked, state)
}
