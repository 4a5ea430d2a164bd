//! Text escaping for the dump line format.
//!
//! The rule is narrower than general JSON escaping, and the
//! output is pure ASCII and byte-for-byte reproducible:
//!
//! - any character `<= 0x1F` or `> 0x7E` is written as `\uXXXX`
//! - `\`, `/` and `"` get a plain backslash escape
//! - everything else is written literally
//!
//! Code points above U+FFFF do not fit in four hex digits; they are written as
//! a UTF-16 surrogate pair so every line remains parseable JSON.
//!
//! # Examples
//!
//! ```
//! use memdump_util::escape::escape_json;
//!
//! assert_eq!(escape_json(r#"\x/y""#), r#""\\x\/y\"""#);
//! assert_eq!(escape_json("\u{12}\u{b5}\u{2030}"), r#""\u0012\u00b5\u2030""#);
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

/// Write `text` as a quoted, escaped string.
pub fn write_json_str<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    let mut buf = String::with_capacity(text.len() + 2);
    push_json_str(&mut buf, text);
    out.write_all(buf.as_bytes())
}

/// Return `text` as a quoted, escaped string.
pub fn escape_json(text: &str) -> String {
    let mut buf = String::with_capacity(text.len() + 2);
    push_json_str(&mut buf, text);
    buf
}

fn push_json_str(buf: &mut String, text: &str) {
    buf.push('"');
    for c in text.chars() {
        let code = c as u32;
        if code <= 0x1f || code > 0x7e {
            push_unicode_escape(buf, code);
        } else if matches!(c, '\\' | '/' | '"') {
            buf.push('\\');
            buf.push(c);
        } else {
            buf.push(c);
        }
    }
    buf.push('"');
}

fn push_unicode_escape(buf: &mut String, code: u32) {
    // Writing into a String cannot fail.
    if code > 0xffff {
        let offset = code - 0x1_0000;
        let high = 0xd800 + (offset >> 10);
        let low = 0xdc00 + (offset & 0x3ff);
        let _ = write!(buf, "\\u{high:04x}\\u{low:04x}");
    } else {
        let _ = write!(buf, "\\u{code:04x}");
    }
}

/// Map raw bytes 1:1 onto code points `0..=255`.
///
/// Byte text has no encoding of its own; this keeps every byte recoverable
/// after escaping (`0xff` becomes `\u00ff`).
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
