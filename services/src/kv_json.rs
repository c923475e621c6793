//! `key=value` text to canonical JSON, and the SHA-256 of that JSON.
//!
//! Canonical form: keys sorted, no insignificant whitespace, ASCII-only
//! output (non-ASCII characters and DEL written as lowercase `\uXXXX`
//! escapes, UTF-16 surrogate pairs above the BMP).

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use serde::Serialize;
use serde_json::ser::Formatter;
use tracing::info;

use crate::{digest::sha256_hex, error::ServiceError, text::strip};

/// Result of converting one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct KvDigest {
    pub canonical_json: String,
    pub sha256_hex: String,
}

/// Decodes `bytes` as UTF-8, parses `key=value` lines and hashes the canonical JSON.
pub fn convert(bytes: &[u8]) -> Result<KvDigest, ServiceError> {
    let text = std::str::from_utf8(bytes)?;
    let pairs = parse_pairs(text);
    let canonical_json = canonical_json(&pairs)?;
    let sha256_hex = sha256_hex(canonical_json.as_bytes());

    info!(hash = %sha256_hex, keys = pairs.len(), "generated hash");
    Ok(KvDigest {
        canonical_json,
        sha256_hex,
    })
}

/// Parses `key=value` lines; lines without `=` are ignored, later keys win.
pub fn parse_pairs(text: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for line in split_lines(strip(text)) {
        if let Some((key, value)) = line.split_once('=') {
            pairs.insert(strip(key).to_string(), strip(value).to_string());
        }
    }
    pairs
}

/// Compact, key-sorted, ASCII-only JSON.
pub fn canonical_json(pairs: &BTreeMap<String, String>) -> Result<String, ServiceError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    pairs.serialize(&mut ser)?;
    // Only ASCII bytes are ever written.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Splits on every Unicode line boundary; `\r\n` counts as one.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                end = j + 1;
            }
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Compact formatter that escapes everything outside printable ASCII.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() && c != '\x7f' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
