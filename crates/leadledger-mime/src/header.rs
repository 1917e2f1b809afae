//! Header block parsing.

use crate::encoding::decode_rfc2047;
use std::collections::HashMap;

/// Collection of message headers, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first raw value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets the first value for a header with RFC 2047 encoded words decoded.
    #[must_use]
    pub fn get_decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_rfc2047)
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no header was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Parses a header block.
    ///
    /// Continuation lines (starting with a space or tab) are unfolded into
    /// the previous header. Parsing stops at the first empty line. Lines
    /// without a colon are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim());
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value.trim());
        }

        headers
    }
}

/// Extracts the bare address from a mailbox header value.
///
/// Handles `Name <user@host>`, `"Quoted, Name" <user@host>` and a bare
/// `user@host` (with or without a trailing comment). Returns `None` when the
/// value contains no `@`.
#[must_use]
pub fn extract_address(value: &str) -> Option<String> {
    if let Some(open) = value.rfind('<') {
        let inner = &value[open + 1..];
        let inner = inner.split('>').next().unwrap_or(inner).trim();
        if inner.contains('@') {
            return Some(inner.to_string());
        }
    }

    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_matches(|c| matches!(c, '"' | '\'' | '(' | ')' | '<' | '>')))
        .find(|token| token.contains('@'))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_add_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_headers_parse_with_continuation() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "Subject: Removals lead from\r\n",
            "\tcomparemymove.com\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Body: not a header\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(
            headers.get("Subject"),
            Some("Removals lead from comparemymove.com")
        );
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert!(headers.get("Body").is_none());
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_headers_repeated_values() {
        let headers = Headers::parse("Received: a\nReceived: b\n\n");
        assert_eq!(headers.get_all("received"), vec!["a", "b"]);
        assert_eq!(headers.get("received"), Some("a"));
    }

    #[test]
    fn test_get_decoded() {
        let headers = Headers::parse("Subject: =?utf-8?B?SMOpbGxv?=\n\n");
        assert_eq!(headers.get_decoded("subject").as_deref(), Some("Héllo"));
    }

    #[test]
    fn test_extract_address() {
        assert_eq!(
            extract_address("CompareMyMove <accounts@comparemymove.com>").as_deref(),
            Some("accounts@comparemymove.com")
        );
        assert_eq!(
            extract_address("\"Smith, John\" <john@example.com>").as_deref(),
            Some("john@example.com")
        );
        assert_eq!(
            extract_address("leads@reallymoving.com (Really Moving)").as_deref(),
            Some("leads@reallymoving.com")
        );
        assert_eq!(extract_address("undisclosed-recipients:;"), None);
    }
}
