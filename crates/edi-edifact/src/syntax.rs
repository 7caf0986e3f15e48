//! EDIFACT syntax definitions and delimiter handling
//!
//! This module handles the service string advice (UNA), the release
//! character escaping of reserved characters and the escape-aware splitting
//! used by the tokenizer.

use serde::{Deserialize, Serialize};

/// Default EDIFACT separators (when no UNA is present)
pub const DEFAULT_COMPONENT_SEPARATOR: char = ':';
pub const DEFAULT_ELEMENT_SEPARATOR: char = '+';
pub const DEFAULT_DECIMAL_POINT: char = '.';
pub const DEFAULT_RELEASE_CHARACTER: char = '?';
pub const DEFAULT_REPETITION_SEPARATOR: char = '*';
pub const DEFAULT_SEGMENT_TERMINATOR: char = '\'';

/// Separators used for parsing EDIFACT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separators {
    /// Component separator (default ':')
    pub component: char,
    /// Element separator (default '+')
    pub element: char,
    /// Decimal point (default '.')
    pub decimal: char,
    /// Release character (default '?')
    pub release: char,
    /// Repetition separator (default '*', a space when unused)
    pub repetition: char,
    /// Segment terminator (default '\'')
    pub segment: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            component: DEFAULT_COMPONENT_SEPARATOR,
            element: DEFAULT_ELEMENT_SEPARATOR,
            decimal: DEFAULT_DECIMAL_POINT,
            release: DEFAULT_RELEASE_CHARACTER,
            repetition: DEFAULT_REPETITION_SEPARATOR,
            segment: DEFAULT_SEGMENT_TERMINATOR,
        }
    }
}

impl Separators {
    /// Parse separators from a UNA segment
    /// UNA format: UNA:+.? '
    /// Positions:  012345678
    pub fn from_una(una: &str) -> Option<Self> {
        let mut chars = una.strip_prefix("UNA")?.chars();
        Some(Self {
            component: chars.next()?,
            element: chars.next()?,
            decimal: chars.next()?,
            release: chars.next()?,
            repetition: chars.next()?,
            segment: chars.next()?,
        })
    }

    /// Create a UNA segment from these separators
    #[must_use]
    pub fn to_una(&self) -> String {
        [
            self.component,
            self.element,
            self.decimal,
            self.release,
            self.repetition,
            self.segment,
        ]
        .iter()
        .fold(String::from("UNA"), |mut una, c| {
            una.push(*c);
            una
        })
    }

    /// Check if a character is reserved (needs escaping)
    ///
    /// A space in the repetition position means "not used" and is never
    /// reserved.
    #[must_use]
    pub fn is_reserved(&self, c: char) -> bool {
        c == self.release
            || c == self.segment
            || c == self.element
            || c == self.component
            || (c == self.repetition && self.repetition != ' ')
    }

    /// Insert the release character before every reserved character
    #[must_use]
    pub fn escape(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            if self.is_reserved(c) {
                escaped.push(self.release);
            }
            escaped.push(c);
        }
        escaped
    }

    /// Remove release characters that precede a reserved character
    ///
    /// A release character followed by anything else is kept.
    #[must_use]
    pub fn unescape(&self, value: &str) -> String {
        let mut unescaped = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();
        while let Some(c) = chars.next() {
            if c == self.release {
                if let Some(&next) = chars.peek() {
                    if self.is_reserved(next) {
                        unescaped.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            unescaped.push(c);
        }
        unescaped
    }
}

/// Split `input` on `delimiter`, honouring `release`
///
/// A delimiter preceded by an unreleased release character is literal and
/// stays in the piece, still escaped. With `drop_empty`, empty pieces are
/// omitted.
#[must_use]
pub fn split(input: &str, delimiter: char, release: char, drop_empty: bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut released = false;

    for (pos, c) in input.char_indices() {
        if released {
            released = false;
        } else if c == release {
            released = true;
        } else if c == delimiter {
            let piece = &input[start..pos];
            if !(drop_empty && piece.is_empty()) {
                pieces.push(piece);
            }
            start = pos + c.len_utf8();
        }
    }

    let rest = &input[start..];
    if !(drop_empty && rest.is_empty()) {
        pieces.push(rest);
    }
    pieces
}
