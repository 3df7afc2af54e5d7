//! Coupon code normalization
//!
//! Input codes and dataset records go through the same rule: surrounding
//! whitespace is dropped and letters are uppercased.

use std::borrow::Cow;
use std::fmt;

/// Shortest accepted code, in characters
pub const MIN_CODE_LENGTH: usize = 8;

/// Longest accepted code, in characters
pub const MAX_CODE_LENGTH: usize = 10;

/// A normalized coupon code
///
/// Only constructible through [`CouponCode::normalize`], so every value held
/// by the cache or handed to a scanner is already trimmed and uppercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Trim surrounding whitespace and uppercase
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// Whether the code passes the 8..=10 character gate
    pub fn has_valid_length(&self) -> bool {
        (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.char_len())
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize one raw dataset record (a line without its terminator)
///
/// ASCII records, the overwhelmingly common case, are borrowed when already
/// uppercase. Records that are not valid UTF-8 are only trimmed; they can
/// never equal a normalized `&str` code anyway.
pub fn normalize_record(record: &[u8]) -> Cow<'_, [u8]> {
    let trimmed = trim_ascii_whitespace(record);

    if trimmed.is_ascii() {
        if trimmed.iter().any(u8::is_ascii_lowercase) {
            return Cow::Owned(trimmed.to_ascii_uppercase());
        }
        return Cow::Borrowed(trimmed);
    }

    match std::str::from_utf8(trimmed) {
        Ok(text) => Cow::Owned(text.trim().to_uppercase().into_bytes()),
        Err(_) => Cow::Borrowed(trimmed),
    }
}

/// Trim the ASCII bytes `char::is_whitespace` accepts
///
/// `<[u8]>::trim_ascii` follows the WHATWG set, which leaves out vertical
/// tab; `str::trim` removes it, so records must too.
fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let is_space = |b: &u8| b.is_ascii_whitespace() || *b == 0x0B;
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}
