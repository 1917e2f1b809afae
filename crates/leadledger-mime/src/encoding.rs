//! Transfer and header decoding.
//!
//! Supports Base64, Quoted-Printable, RFC 2047 encoded words and the
//! handful of charsets lead emails actually arrive in.

use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data, ignoring embedded line breaks and other whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// Malformed escapes are kept literally; aggregator mailers are not always
/// careful about escaping a bare `=`.
#[must_use]
pub fn decode_quoted_printable(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        // Soft line break
        if let Some([b'\r', b'\n']) = bytes.get(i + 1..i + 3) {
            i += 3;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'\n') {
            i += 2;
            continue;
        }

        let decoded = bytes
            .get(i + 1..i + 3)
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        if let Some(value) = decoded {
            result.push(value);
            i += 3;
        } else {
            result.push(b'=');
            i += 1;
        }
    }

    result
}

/// Converts bytes in the given charset to a `String`.
///
/// Unknown charsets are treated as UTF-8 with lossy replacement.
#[must_use]
pub fn decode_charset(bytes: &[u8], charset: &str) -> String {
    let charset = charset.trim().trim_matches('"').to_ascii_lowercase();
    match charset.as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin1" | "latin-1" => {
            bytes.iter().copied().map(char::from).collect()
        }
        "windows-1252" | "cp1252" | "x-cp1252" => {
            bytes.iter().copied().map(windows_1252_char).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Code points for bytes 0x80 to 0x9F in windows-1252. Undefined bytes
/// map to U+FFFD.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

fn windows_1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Format: `=?charset?encoding?encoded-text?=`. Whitespace between two
/// adjacent encoded words is dropped, as the RFC requires. Text that only
/// looks like an encoded word is left untouched.
#[must_use]
pub fn decode_rfc2047(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut last_was_encoded = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((decoded, consumed)) = decode_encoded_word(candidate) {
            if !(last_was_encoded && before.chars().all(char::is_whitespace)) {
                out.push_str(before);
            }
            out.push_str(&decoded);
            rest = &candidate[consumed..];
            last_was_encoded = true;
        } else {
            out.push_str(before);
            out.push_str("=?");
            rest = &candidate[2..];
            last_was_encoded = false;
        }
    }

    out.push_str(rest);
    out
}

/// Decodes one encoded word at the start of `s`, returning the text and the
/// number of bytes consumed.
fn decode_encoded_word(s: &str) -> Option<(String, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, after_charset) = inner.split_once('?')?;
    let (encoding, after_encoding) = after_charset.split_once('?')?;
    let end = after_encoding.find("?=")?;
    let payload = &after_encoding[..end];

    if charset.is_empty() || payload.contains(char::is_whitespace) {
        return None;
    }
    // RFC 2231 language suffix: charset*lang
    let charset = charset.split('*').next().unwrap_or(charset);

    let bytes = match encoding {
        "B" | "b" => decode_base64(payload).ok()?,
        "Q" | "q" => decode_quoted_printable(&payload.replace('_', " ")),
        _ => return None,
    };

    let consumed = s.len() - after_encoding.len() + end + 2;
    Some((decode_charset(&bytes, charset), consumed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_decode_with_line_breaks() {
        let decoded = decode_base64("SGVsbG8s\r\nIFdvcmxkIQ==").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello, World!"), b"Hello, World!");
        assert_eq!(
            String::from_utf8(decode_quoted_printable("H=C3=A9llo")).unwrap(),
            "Héllo"
        );
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld"), b"HelloWorld");
        assert_eq!(decode_quoted_printable("Hello=\nWorld"), b"HelloWorld");
    }

    #[test]
    fn test_quoted_printable_keeps_stray_equals() {
        assert_eq!(decode_quoted_printable("a = b"), b"a = b");
        assert_eq!(decode_quoted_printable("width=3D100%"), b"width=100%");
    }

    #[test]
    fn test_decode_charset_latin1() {
        assert_eq!(decode_charset(&[0x63, 0x61, 0x66, 0xE9], "ISO-8859-1"), "café");
        assert_eq!(decode_charset("café".as_bytes(), "utf-8"), "café");
    }

    #[test]
    fn test_decode_charset_windows_1252_punctuation() {
        let bytes = b"O\x92Neill \x93quote\x94 \x8050 \x96 caf\xE9";
        assert_eq!(
            decode_charset(bytes, "Windows-1252"),
            "O\u{2019}Neill \u{201C}quote\u{201D} \u{20AC}50 \u{2013} caf\u{e9}"
        );
        assert_eq!(decode_charset(&[0x81], "cp1252"), "\u{FFFD}");
        assert_eq!(decode_charset(&[0x92], "iso-8859-1"), "\u{92}");
    }

    #[test]
    fn test_rfc2047_plain_text_untouched() {
        assert_eq!(decode_rfc2047("Hello"), "Hello");
        assert_eq!(decode_rfc2047("a =? b"), "a =? b");
    }

    #[test]
    fn test_rfc2047_base64() {
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?="), "Héllo");
    }

    #[test]
    fn test_rfc2047_quoted_printable() {
        assert_eq!(decode_rfc2047("=?utf-8?Q?H=C3=A9llo_there?="), "Héllo there");
    }

    #[test]
    fn test_rfc2047_adjacent_words_and_surrounding_text() {
        let decoded = decode_rfc2047("Lead: =?utf-8?Q?John?= =?utf-8?Q?_Smith?= (new)");
        assert_eq!(decoded, "Lead: John Smith (new)");
    }

    proptest! {
        #[test]
        fn prop_base64_decodes_what_was_encoded(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = STANDARD.encode(&data);
            // Mailers wrap encoded bodies at 76 columns
            let wrapped = encoded
                .as_bytes()
                .chunks(76)
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect::<Vec<_>>()
                .join("\r\n");
            prop_assert_eq!(decode_base64(&wrapped).unwrap(), data);
        }

        #[test]
        fn prop_quoted_printable_without_escapes_is_identity(text in "[^=]{0,200}") {
            prop_assert_eq!(decode_quoted_printable(&text), text.as_bytes());
        }
    }
}
