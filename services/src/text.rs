//! Text normalisation shared by the form-driven transforms.

use std::borrow::Cow;

/// Characters stripped from both ends of keys, values and attributes:
/// Unicode whitespace plus the ASCII separators `\x1c`..=`\x1f`.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Trims [`is_space`] characters from both ends.
pub fn strip(s: &str) -> &str {
    s.trim_matches(is_space)
}

/// Parses a float, accepting `_` grouping between ASCII digits (`1_000.5`).
///
/// Non-ASCII digits are not accepted.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = strip(s);
    let cleaned: Cow<'_, str> = if s.contains('_') {
        let bytes = s.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'_' {
                let before = i.checked_sub(1).map(|j| bytes[j]);
                let after = bytes.get(i + 1).copied();
                if !matches!(before, Some(b'0'..=b'9')) || !matches!(after, Some(b'0'..=b'9')) {
                    return None;
                }
            }
        }
        Cow::Owned(s.replace('_', ""))
    } else {
        Cow::Borrowed(s)
    };
    cleaned.parse().ok()
}
