//! ISBN detection in catalogue page text.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

/// ISBN-13 prefix 978/979 followed by digit groups with optional separators.
///
/// Groups are greedy and a separator may be a space, so two ISBNs separated
/// by nothing but whitespace are read as one long candidate.
const ISBN_PATTERN: &str =
    r"97[89][-\s]?[0-9]{1,5}[-\s]?[0-9]{1,7}[-\s]?[0-9]{1,7}[-\s]?[0-9X]";

/// Unique ISBN candidates found on one page, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IsbnMatches {
    pub candidates: Vec<String>,
}

impl IsbnMatches {
    /// The candidate used to name the cover, if any.
    pub fn selected(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Comma separated list, or `NONE` when nothing was found.
    pub fn display_list(&self) -> String {
        if self.candidates.is_empty() {
            "NONE".to_string()
        } else {
            self.candidates.join(", ")
        }
    }
}

/// Finds ISBN-like digit runs in free text.
#[derive(Debug, Clone)]
pub struct IsbnExtractor {
    pattern: Regex,
}

impl IsbnExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(ISBN_PATTERN).expect("ISBN pattern is a valid regex"),
        }
    }

    /// Scan `text` and return the normalized, de-duplicated candidates.
    pub fn extract(&self, text: &str) -> IsbnMatches {
        let mut seen = HashSet::new();
        let candidates = self
            .pattern
            .find_iter(text)
            .map(|m| normalize(m.as_str()))
            .filter(|isbn| !isbn.is_empty() && seen.insert(isbn.clone()))
            .collect();
        IsbnMatches { candidates }
    }
}

impl Default for IsbnExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop every character that is not a digit or an uppercase `X`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X')
        .collect()
}

/// Check the ISBN-13 mod-10 checksum of a normalized candidate.
pub fn is_valid_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 || !isbn.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = isbn
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();
    sum % 10 == 0
}
