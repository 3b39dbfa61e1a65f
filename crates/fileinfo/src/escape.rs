//! Printable-ASCII escaping for binary attribute payloads.
//!
//! Extended-attribute values are arbitrary byte blobs, while the bag stores
//! them in a text slot that downstream serializers treat as a C string. Every
//! byte outside the printable ASCII range, and the escape character itself, is
//! replaced by a four character `\xHL` sequence.
//!
//! # Wire compatibility
//!
//! The two digits are computed as `(c >> 8) & 0xf` and `c & 0xf` on the byte
//! widened to an integer. The first digit is therefore always `0` and the high
//! nibble of the byte is lost, so the transform is not reversible for bytes
//! above `0x0f`. Consumers already depend on this exact output, so it is kept
//! as is.

use std::borrow::Cow;

/// Character that introduces an escape sequence.
pub const ESCAPE_CHAR: u8 = b'\\';

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Reports whether `byte` can be emitted without escaping.
#[inline]
#[must_use]
pub const fn is_safe_byte(byte: u8) -> bool {
    byte >= 32 && byte <= 126 && byte != ESCAPE_CHAR
}

/// Escapes `bytes` into printable ASCII.
///
/// Returns the input borrowed when no byte needs escaping.
#[must_use]
pub fn escape_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let unsafe_count = bytes.iter().filter(|&&byte| !is_safe_byte(byte)).count();
    if unsafe_count == 0 {
        // Safe bytes are all ASCII.
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Cow::Borrowed(text);
        }
    }

    let mut escaped = String::with_capacity(bytes.len() + unsafe_count * 3);
    for &byte in bytes {
        if is_safe_byte(byte) {
            escaped.push(char::from(byte));
        } else {
            let wide = u32::from(byte);
            escaped.push(char::from(ESCAPE_CHAR));
            escaped.push('x');
            escaped.push(char::from(HEX_DIGITS[((wide >> 8) & 0xf) as usize]));
            escaped.push(char::from(HEX_DIGITS[(wide & 0xf) as usize]));
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_input_is_borrowed_unchanged() {
        let input = b"user.comment = hello world ~!";
        let escaped = escape_bytes(input);
        assert!(matches!(escaped, Cow::Borrowed(_)));
        assert_eq!(escaped.as_bytes(), input);
    }

    #[test]
    fn empty_input_is_borrowed() {
        assert!(matches!(escape_bytes(b""), Cow::Borrowed("")));
    }

    #[test]
    fn every_safe_byte_passes_through() {
        let safe: Vec<u8> = (32u8..=126).filter(|&b| b != b'\\').collect();
        let escaped = escape_bytes(&safe);
        assert!(matches!(escaped, Cow::Borrowed(_)));
        assert_eq!(escaped.as_bytes(), safe.as_slice());
    }

    #[test]
    fn high_byte_uses_legacy_encoding() {
        // (0xff >> 8) & 0xf == 0, 0xff & 0xf == 0xf
        assert_eq!(escape_bytes(&[0xff]), "\\x0f");
        assert_eq!(escape_bytes(&[0xa7]), "\\x07");
        assert_eq!(escape_bytes(&[0x80]), "\\x00");
    }

    #[test]
    fn control_bytes_and_escape_char_are_escaped() {
        assert_eq!(escape_bytes(b"a\0b"), "a\\x00b");
        assert_eq!(escape_bytes(b"\n"), "\\x0a");
        assert_eq!(escape_bytes(b"\x7f"), "\\x0f");
        assert_eq!(escape_bytes(b"C:\\dir"), "C:\\x0cdir");
    }

    #[test]
    fn output_is_printable_and_nul_free() {
        let input: Vec<u8> = (0u8..=255).collect();
        let escaped = escape_bytes(&input);
        assert!(matches!(escaped, Cow::Owned(_)));
        assert!(escaped.bytes().all(|b| (32..=126).contains(&b)));
        assert!(!escaped.contains('\0'));
        // 94 safe bytes kept, 162 expanded to four characters each.
        assert_eq!(escaped.len(), 94 + 162 * 4);
    }
}
