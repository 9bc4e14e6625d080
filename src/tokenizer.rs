//! Whitespace tokenizer and the parsed command form
//!
//! There is deliberately no quoting or escaping: a token is any maximal run of
//! non-whitespace characters.

use std::iter::FusedIterator;
use std::str::SplitWhitespace;

/// Lazy token stream over a single input line.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl FusedIterator for Tokens<'_> {}

/// Split `line` on runs of whitespace.
#[must_use]
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens {
        inner: line.split_whitespace(),
    }
}

/// A non-empty command: a verb followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    args: Vec<String>,
}

impl Command {
    /// Parse a line into a command; `None` when the line holds no tokens.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = tokenize(line);
        let verb = tokens.next()?.to_string();
        let args = tokens.map(str::to_string).collect();
        Some(Self { verb, args })
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of tokens, verb included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len() + 1
    }

    /// Commands are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}
