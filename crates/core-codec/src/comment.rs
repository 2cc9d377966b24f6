//! Comment text transport.
//!
//! Text is percent-escaped the way JavaScript's `escape()` does it (UTF-16
//! code units, `%XX` below 256 and `%uXXXX` above), and the escaped ASCII is
//! packed four characters per five digits over the printable table below.

use unicode_segmentation::UnicodeSegmentation;

use crate::DecodeError;
use crate::values::{ValueWriter, Values};

/// Longest escaped comment the two-digit length prefix can carry.
pub const MAX_ESCAPED_LEN: usize = 4095;

const CHARS: &[u8; 95] = b" !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";
const RADIX: u32 = CHARS.len() as u32 + 1;

fn is_unreserved(unit: u16) -> bool {
    u8::try_from(unit)
        .map(|b| b.is_ascii_alphanumeric() || b"@*_+-./".contains(&b))
        .unwrap_or(false)
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for unit in text.encode_utf16() {
        if is_unreserved(unit) {
            out.push(unit as u8 as char);
        } else if unit < 256 {
            out.push_str(&format!("%{unit:02X}"));
        } else {
            out.push_str(&format!("%u{unit:04X}"));
        }
    }
    out
}

/// Inverse of [`escape`]. Malformed escapes are kept literally and unpaired
/// surrogates become U+FFFD.
pub(crate) fn unescape(escaped: &str) -> String {
    let bytes = escaped.as_bytes();
    let hex = |range: std::ops::Range<usize>| {
        bytes
            .get(range)
            .filter(|s| s.iter().all(u8::is_ascii_hexdigit))
            .and_then(|s| std::str::from_utf8(s).ok())
            .and_then(|s| u16::from_str_radix(s, 16).ok())
    };
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if bytes.get(i + 1) == Some(&b'u') {
                if let Some(unit) = hex(i + 2..i + 6) {
                    units.push(unit);
                    i += 6;
                    continue;
                }
            }
            if let Some(unit) = hex(i + 1..i + 3) {
                units.push(unit);
                i += 3;
                continue;
            }
        }
        units.push(u16::from(bytes[i]));
        i += 1;
    }
    String::from_utf16_lossy(&units)
}

/// Escape `text`, dropping whole trailing graphemes until the escaped form
/// fits in [`MAX_ESCAPED_LEN`].
pub(crate) fn escape_truncated(text: &str) -> String {
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        let piece = escape(grapheme);
        if out.len() + piece.len() > MAX_ESCAPED_LEN {
            break;
        }
        out.push_str(&piece);
    }
    out
}

pub(crate) fn write(writer: &mut ValueWriter, text: &str) {
    let escaped = escape_truncated(text);
    writer.push(escaped.len() as u32, 2);
    for chunk in escaped.as_bytes().chunks(4) {
        let value = chunk.iter().rev().fold(0, |acc, b| {
            // Escaped text is printable ASCII by construction.
            let index = CHARS.iter().position(|c| c == b).unwrap_or(0) as u32;
            acc * RADIX + index
        });
        writer.push(value, 5);
    }
}

pub(crate) fn read(values: &mut Values) -> Result<String, DecodeError> {
    let len = values.poll(2)? as usize;
    let mut escaped = String::with_capacity(len);
    while escaped.len() < len {
        let mut value = values.poll(5)?;
        for _ in 0..4.min(len - escaped.len()) {
            let ch = CHARS
                .get((value % RADIX) as usize)
                .ok_or(DecodeError::InvalidComment)?;
            escaped.push(*ch as char);
            value /= RADIX;
        }
    }
    Ok(unescape(&escaped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_matches_javascript() {
        assert_eq!(escape("#Q=[](T)SZ"), "%23Q%3D%5B%5D%28T%29SZ");
        assert_eq!(escape("a b/c"), "a%20b/c");
        assert_eq!(escape("é"), "%E9");
        assert_eq!(escape("テト"), "%u30C6%u30C8");
    }

    #[test]
    fn unescape_inverts_escape() {
        for text in ["hello world", "#Q=[O](J)LI", "テトリス 100%", "😀"] {
            assert_eq!(unescape(&escape(text)), text);
        }
    }

    #[test]
    fn unescape_keeps_malformed_sequences() {
        assert_eq!(unescape("100%"), "100%");
        assert_eq!(unescape("%zz%u12"), "%zz%u12");
    }

    #[test]
    fn truncation_respects_graphemes() {
        let text = "テ".repeat(1000);
        let escaped = escape_truncated(&text);
        assert_eq!(escaped.len(), 682 * 6);
        assert!(escaped.len() <= MAX_ESCAPED_LEN);
        assert_eq!(unescape(&escaped), "テ".repeat(682));
    }

    #[test]
    fn packed_comment_reads_back() {
        let mut writer = ValueWriter::new();
        write(&mut writer, "hello");
        let text = writer.finish();
        let mut values = Values::parse(&text.replace('?', "")).unwrap();
        assert_eq!(read(&mut values).unwrap(), "hello");
        assert!(values.is_empty());
    }
}
