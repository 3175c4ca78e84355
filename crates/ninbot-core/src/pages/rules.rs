//! Named extraction rules.
//!
//! A [`Rule`] pairs a field name with a pattern that is compiled on first
//! use. Failures are reported against the page kind and field, so an error
//! names exactly which fragment of the markup drifted.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{PageKind, ParseError};

/// A pattern that extracts one field (or one repeated entry) from a page.
pub struct Rule {
    pub field: &'static str,
    pattern: &'static str,
    compiled: OnceLock<Regex>,
}

impl Rule {
    pub const fn new(field: &'static str, pattern: &'static str) -> Self {
        Self {
            field,
            pattern,
            compiled: OnceLock::new(),
        }
    }

    pub fn regex(&self) -> &Regex {
        self.compiled
            .get_or_init(|| Regex::new(self.pattern).expect("extraction rule pattern is valid"))
    }

    /// First match, or a `MissingField` error.
    pub fn first<'h>(&self, page: PageKind, html: &'h str) -> Result<Captures<'h>, ParseError> {
        self.regex().captures(html).ok_or_else(|| self.missing(page))
    }

    /// Last match in the document, or a `MissingField` error.
    pub fn last<'h>(&self, page: PageKind, html: &'h str) -> Result<Captures<'h>, ParseError> {
        self.regex().captures_iter(html).last().ok_or_else(|| self.missing(page))
    }

    /// Every match in document order. No match is a `MissingField` error.
    pub fn all<'h>(&self, page: PageKind, html: &'h str) -> Result<Vec<Captures<'h>>, ParseError> {
        let matches: Vec<Captures<'h>> = self.regex().captures_iter(html).collect();
        if matches.is_empty() {
            return Err(self.missing(page));
        }
        Ok(matches)
    }

    /// Parse a numeric capture group.
    pub fn number<N: FromStr>(&self, page: PageKind, raw: &str) -> Result<N, ParseError> {
        raw.parse::<N>().map_err(|_| ParseError::InvalidNumber {
            page,
            field: self.field,
            value: raw.to_string(),
        })
    }

    fn missing(&self, page: PageKind) -> ParseError {
        ParseError::MissingField {
            page,
            field: self.field,
        }
    }
}

/// Text of a capture group, empty when the group did not participate.
pub fn group<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}
