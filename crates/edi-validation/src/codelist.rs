//! Code list translation

use edi_schema::Code;

/// Description of `value` in `codes`, `None` when the value is not a listed code.
#[must_use]
pub fn translate<'a>(value: &str, codes: &'a [Code]) -> Option<&'a str> {
    codes
        .iter()
        .find(|entry| entry.code == value)
        .map(|entry| entry.description.as_str())
}
