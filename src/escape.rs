//! RFC 2254 filter value escaping.
//!
//! Any control character with an ASCII code below 32, as well as the
//! characters with special meaning in LDAP filters (`*`, `(`, `)` and the
//! backslash), is converted into a backslash followed by two hex digits.
//!
//! The functions here are pure and shape-preserving: a single value in gives
//! a single value out, a slice in gives a vector of the same length out.
//!
//! ```rust
//! use ldap_user_manager::escape::{escape_value, unescape_value};
//!
//! let escaped = escape_value("john*(doe)");
//! assert_eq!(escaped, r"john\2a\28doe\29");
//! assert_eq!(unescape_value(&escaped), "john*(doe)");
//! ```

/// Token emitted for an empty value so that it stays visible in a filter.
pub const EMPTY_VALUE: &str = r"\0";

/// Escape a single filter value.
///
/// Filter metacharacters are replaced before control characters are
/// considered, so the backslashes introduced by escaping are never escaped
/// a second time. An empty value yields the literal two-character token
/// [`EMPTY_VALUE`].
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str(r"\5c"),
            '*' => escaped.push_str(r"\2a"),
            '(' => escaped.push_str(r"\28"),
            ')' => escaped.push_str(r"\29"),
            c if (c as u32) < 32 => escaped.push_str(&format!("\\{:02x}", c as u32)),
            c => escaped.push(c),
        }
    }

    if escaped.is_empty() {
        return EMPTY_VALUE.to_string();
    }
    escaped
}

/// Escape every value of a sequence independently.
pub fn escape_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| escape_value(v.as_ref())).collect()
}

/// Undo [`escape_value`] on raw bytes.
///
/// Every backslash followed by two hex digits (either case) is replaced by the
/// byte it encodes. Everything else is copied through untouched, including
/// backslashes that do not start a valid sequence.
pub fn unescape_bytes(value: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i] == b'\\' && i + 2 < value.len() {
            if let (Some(high), Some(low)) = (hex_digit(value[i + 1]), hex_digit(value[i + 2])) {
                decoded.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        decoded.push(value[i]);
        i += 1;
    }

    decoded
}

/// Undo [`escape_value`].
///
/// Decoded sequences that do not form valid UTF-8 are replaced with
/// U+FFFD; use [`unescape_bytes`] when the raw bytes matter.
pub fn unescape_value(value: &str) -> String {
    match String::from_utf8(unescape_bytes(value.as_bytes())) {
        Ok(decoded) => decoded,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Unescape every value of a sequence independently.
pub fn unescape_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| unescape_value(v.as_ref())).collect()
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
