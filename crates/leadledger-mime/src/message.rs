//! MIME message structure and body selection.

use chrono::{DateTime, Utc};

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_charset, decode_quoted_printable};
use crate::error::{Error, Result};
use crate::header::{Headers, extract_address};

/// Nesting limit for multipart bodies.
const MAX_DEPTH: usize = 16;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from a header value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }
}

/// One MIME entity: headers, raw body and, for multiparts, its children.
#[derive(Debug, Clone)]
pub struct Part {
    /// Entity headers.
    pub headers: Headers,
    /// Raw (still transfer-encoded) body.
    pub body: String,
    /// Child entities of a multipart body.
    pub parts: Vec<Part>,
}

impl Part {
    /// Parses an entity, descending into multipart children.
    ///
    /// # Errors
    ///
    /// Returns an error for a multipart without a boundary or nesting
    /// deeper than the supported limit.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_at_depth(raw, 0)
    }

    fn parse_at_depth(raw: &str, depth: usize) -> Result<Self> {
        let (head, body) = split_head_body(raw);
        let headers = Headers::parse(head);
        let mut part = Self {
            headers,
            body: body.to_string(),
            parts: Vec::new(),
        };

        let content_type = part.content_type();
        if content_type.is_multipart() {
            if depth >= MAX_DEPTH {
                return Err(Error::NestingTooDeep(MAX_DEPTH));
            }
            let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
            part.parts = split_multipart(body, boundary)
                .iter()
                .map(|child| Self::parse_at_depth(child, depth + 1))
                .collect::<Result<_>>()?;
        }

        Ok(part)
    }

    /// Gets the content type, falling back to `text/plain` when the header is
    /// absent or malformed.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|value| ContentType::parse(value).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Whether the entity is marked as an attachment.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.headers
            .get("content-disposition")
            .is_some_and(|value| value.trim_start().to_lowercase().starts_with("attachment"))
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if a Base64 body is malformed.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&self.body),
            TransferEncoding::QuotedPrintable => Ok(decode_quoted_printable(&self.body)),
            _ => Ok(self.body.clone().into_bytes()),
        }
    }

    /// Gets the decoded body as text in its declared charset.
    ///
    /// # Errors
    ///
    /// Returns an error if transfer decoding fails.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        let content_type = self.content_type();
        Ok(decode_charset(&decoded, content_type.charset().unwrap_or("utf-8")))
    }

    /// Depth-first search for the first inline entity of the given text subtype.
    fn find_text(&self, sub_type: &str) -> Option<&Self> {
        if self.parts.is_empty() {
            return (self.content_type().is("text", sub_type) && !self.is_attachment())
                .then_some(self);
        }
        self.parts.iter().find_map(|child| child.find_text(sub_type))
    }
}

/// A parsed message.
#[derive(Debug, Clone)]
pub struct Message {
    root: Part,
}

impl Message {
    /// Parses a raw RFC 5322 message.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no headers or the multipart
    /// structure is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let root = Part::parse(raw)?;
        if root.headers.is_empty() {
            return Err(Error::EmptyMessage);
        }
        Ok(Self { root })
    }

    /// Message headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.root.headers
    }

    /// Top-level entity.
    #[must_use]
    pub const fn root(&self) -> &Part {
        &self.root
    }

    /// Decoded `From` header.
    #[must_use]
    pub fn from(&self) -> Option<String> {
        self.root.headers.get_decoded("from")
    }

    /// Bare sender address from the `From` header.
    #[must_use]
    pub fn from_address(&self) -> Option<String> {
        self.from().as_deref().and_then(extract_address)
    }

    /// Decoded `Subject` header.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.root.headers.get_decoded("subject")
    }

    /// `Message-ID` header without angle brackets.
    #[must_use]
    pub fn message_id(&self) -> Option<String> {
        self.root
            .headers
            .get("message-id")
            .map(|id| id.trim().trim_start_matches('<').trim_end_matches('>').to_string())
    }

    /// `Date` header as UTC, if it parses as RFC 2822.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let value = self.root.headers.get("date")?;
        // Drop trailing comments such as "(UTC)"
        let value = value.split('(').next().unwrap_or(value).trim();
        DateTime::parse_from_rfc2822(value)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    /// First inline `text/plain` body, decoded.
    #[must_use]
    pub fn text_body(&self) -> Option<String> {
        self.root.find_text("plain").and_then(|part| part.body_text().ok())
    }

    /// First inline `text/html` body, decoded.
    #[must_use]
    pub fn html_body(&self) -> Option<String> {
        self.root.find_text("html").and_then(|part| part.body_text().ok())
    }
}

/// Splits an entity at the first empty line.
fn split_head_body(raw: &str) -> (&str, &str) {
    if let Some(rest) = raw.strip_prefix("\r\n").or_else(|| raw.strip_prefix('\n')) {
        return ("", rest);
    }

    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((index, len)) => (&raw[..index], &raw[index + len..]),
        None => (raw, ""),
    }
}

/// Splits a multipart body into its raw child entities.
///
/// The preamble and epilogue are dropped. The line break before each
/// delimiter belongs to the delimiter. An unterminated final part is kept.
fn split_multipart(body: &str, boundary: &str) -> Vec<String> {
    let delimiter = format!("--{boundary}");
    let closing = format!("{delimiter}--");
    let mut parts = Vec::new();
    let mut current: Option<String> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == delimiter || trimmed == closing {
            if let Some(part) = current.take() {
                parts.push(strip_line_break(part));
            }
            if trimmed == closing {
                return parts;
            }
            current = Some(String::new());
        } else if let Some(part) = current.as_mut() {
            part.push_str(line);
        }
    }

    if let Some(part) = current.filter(|p| !p.trim().is_empty()) {
        parts.push(strip_line_break(part));
    }
    parts
}

fn strip_line_break(mut part: String) -> String {
    if part.ends_with("\r\n") {
        part.truncate(part.len() - 2);
    } else if part.ends_with('\n') {
        part.truncate(part.len() - 1);
    }
    part
}
