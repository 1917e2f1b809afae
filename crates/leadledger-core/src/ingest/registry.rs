//! Dispatch from a message to the extractor for its source.

use tracing::debug;

use super::document::MessageBody;
use super::extract::{Extractor, GENERIC, ParseResult};
use super::source::SourceDetector;
use crate::mailbox::InboundMessage;

/// Routes messages to per-source extractors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserRegistry {
    detector: SourceDetector,
    website_domain: Option<String>,
}

impl ParserRegistry {
    /// Registry over a custom detector.
    #[must_use]
    pub const fn new(detector: SourceDetector) -> Self {
        Self {
            detector,
            website_domain: None,
        }
    }

    /// Registry with the built-in rules plus the company website domain.
    ///
    /// Addresses at that domain are never taken as a customer's email.
    #[must_use]
    pub fn with_website_domain(domain: &str) -> Self {
        let domain = domain.trim().to_ascii_lowercase();
        Self {
            detector: SourceDetector::new(Some(&domain)),
            website_domain: Some(domain).filter(|d| !d.is_empty()),
        }
    }

    /// Detector used for routing.
    #[must_use]
    pub const fn detector(&self) -> &SourceDetector {
        &self.detector
    }

    /// The dedicated extractor for a message, or `None` if its source is
    /// not recognised.
    #[must_use]
    pub fn detect_parser(&self, from: &str, subject: &str) -> Option<Extractor> {
        self.detector.detect(from, subject).extractor()
    }

    /// Parse a message with its source's extractor, falling back to the
    /// generic extractor for unrecognised sources.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`](super::ParseFailure) when no contact
    /// identifier can be found.
    pub fn parse_email(
        &self,
        from: &str,
        subject: &str,
        text: Option<&str>,
        html: Option<&str>,
    ) -> ParseResult {
        let extractor = self.detect_parser(from, subject).unwrap_or(GENERIC);
        let body = MessageBody {
            subject,
            text,
            html,
        };

        let own_domain = self.website_domain.as_deref();
        let result = extractor.extract_excluding(&body, own_domain.as_slice());
        match &result {
            Ok(lead) => debug!(
                source = lead.source.as_str(),
                email = lead.fields.email.as_deref(),
                "Extracted lead"
            ),
            Err(failure) => debug!(
                source = failure.lead_source().as_str(),
                reason = %failure,
                "Extraction failed"
            ),
        }
        result
    }

    /// Parse an inbound message.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`](super::ParseFailure) when no contact
    /// identifier can be found.
    pub fn parse_message(&self, message: &InboundMessage) -> ParseResult {
        self.parse_email(
            &message.from,
            &message.subject,
            message.text.as_deref(),
            message.html.as_deref(),
        )
    }
}
