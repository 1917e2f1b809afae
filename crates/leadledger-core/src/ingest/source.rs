//! Lead source identification.
//!
//! Inbound enquiries arrive from lead aggregators and from the company's own
//! instant-quote form. [`SourceDetector`] classifies a message from its
//! sender and subject with an ordered list of [`SourceRule`]s; the first
//! matching rule wins.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::{self, Extractor};

/// Where an enquiry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// comparemymove.com aggregator.
    CompareMyMove,
    /// reallymoving.com aggregator.
    ReallyMoving,
    /// getamover.co.uk aggregator.
    GetAMover,
    /// The company's own instant-quote web form.
    Website,
    /// Nothing matched.
    Unknown,
}

impl SourceId {
    /// Sources with a dedicated extractor, in fallback order.
    pub const KNOWN: [Self; 4] = [
        Self::CompareMyMove,
        Self::ReallyMoving,
        Self::GetAMover,
        Self::Website,
    ];

    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "comparemymove" => Self::CompareMyMove,
            "reallymoving" => Self::ReallyMoving,
            "getamover" => Self::GetAMover,
            "website" => Self::Website,
            _ => Self::Unknown,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompareMyMove => "comparemymove",
            Self::ReallyMoving => "reallymoving",
            Self::GetAMover => "getamover",
            Self::Website => "website",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::CompareMyMove => "CompareMyMove",
            Self::ReallyMoving => "ReallyMoving",
            Self::GetAMover => "GetAMover",
            Self::Website => "Website",
            Self::Unknown => "Unknown",
        }
    }

    /// The dedicated extractor for this source, if it has one.
    #[must_use]
    pub const fn extractor(self) -> Option<Extractor> {
        match self {
            Self::CompareMyMove => Some(extract::compare_my_move::EXTRACTOR),
            Self::ReallyMoving => Some(extract::really_moving::EXTRACTOR),
            Self::GetAMover => Some(extract::get_a_mover::EXTRACTOR),
            Self::Website => Some(extract::website::EXTRACTOR),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for SourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Sender address split into local part and domain, both lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sender {
    local_part: String,
    domain: String,
}

impl Sender {
    /// Reads a `From` value, with or without a display name.
    fn parse(from: &str) -> Option<Self> {
        let address = leadledger_mime::extract_address(from)
            .unwrap_or_else(|| from.trim().to_string())
            .to_lowercase();
        let (local_part, domain) = address.rsplit_once('@')?;
        Some(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }
}

/// A predicate over sender and subject that names a source.
///
/// Every condition set on the rule must hold. Subject tokens and local parts
/// are alternatives within their own condition. A rule with no conditions
/// never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    source: SourceId,
    subject_tokens: Vec<String>,
    sender_domain: Option<String>,
    local_parts: Vec<String>,
}

impl SourceRule {
    /// Create an empty rule for `source`.
    #[must_use]
    pub const fn new(source: SourceId) -> Self {
        Self {
            source,
            subject_tokens: Vec::new(),
            sender_domain: None,
            local_parts: Vec::new(),
        }
    }

    /// Require the subject to contain one of `tokens` (case-insensitive).
    #[must_use]
    pub fn subject_contains_any(mut self, tokens: &[&str]) -> Self {
        self.subject_tokens = tokens.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    /// Require the sender domain to be `domain` or one of its subdomains.
    #[must_use]
    pub fn sender_domain(mut self, domain: &str) -> Self {
        self.sender_domain = Some(domain.trim().to_lowercase());
        self
    }

    /// Require the sender's local part to be one of `local_parts`.
    #[must_use]
    pub fn sender_local_part_in(mut self, local_parts: &[&str]) -> Self {
        self.local_parts = local_parts.iter().map(|l| l.to_lowercase()).collect();
        self
    }

    /// Source named by this rule.
    #[must_use]
    pub const fn source(&self) -> SourceId {
        self.source
    }

    fn matches(&self, sender: Option<&Sender>, subject: &str) -> bool {
        if self.subject_tokens.is_empty() && self.sender_domain.is_none() && self.local_parts.is_empty()
        {
            return false;
        }

        let subject_ok = self.subject_tokens.is_empty()
            || self.subject_tokens.iter().any(|t| subject.contains(t.as_str()));

        let domain_ok = self.sender_domain.as_deref().is_none_or(|expected| {
            sender.is_some_and(|s| super::fields::domain_matches(&s.domain, expected))
        });

        let local_ok = self.local_parts.is_empty()
            || sender.is_some_and(|s| self.local_parts.contains(&s.local_part));

        subject_ok && domain_ok && local_ok
    }
}

/// Ordered rule list classifying messages by source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDetector {
    rules: Vec<SourceRule>,
}

impl Default for SourceDetector {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SourceDetector {
    /// Built-in rules, plus a sender-domain rule for the company's own
    /// website when `website_domain` is given.
    ///
    /// Subject brand tokens come first, then aggregator sender domains, then
    /// the website domain, then the generic no-reply instant-quote rule.
    #[must_use]
    pub fn new(website_domain: Option<&str>) -> Self {
        let mut rules = vec![
            SourceRule::new(SourceId::CompareMyMove).subject_contains_any(&["comparemymove"]),
            SourceRule::new(SourceId::ReallyMoving).subject_contains_any(&["reallymoving"]),
            SourceRule::new(SourceId::GetAMover).subject_contains_any(&["getamover", "get a mover"]),
            SourceRule::new(SourceId::CompareMyMove).sender_domain("comparemymove.com"),
            SourceRule::new(SourceId::ReallyMoving).sender_domain("reallymoving.com"),
            SourceRule::new(SourceId::GetAMover).sender_domain("getamover.co.uk"),
        ];

        if let Some(domain) = website_domain.map(str::trim).filter(|d| !d.is_empty()) {
            rules.push(SourceRule::new(SourceId::Website).sender_domain(domain));
        }

        rules.push(
            SourceRule::new(SourceId::Website)
                .sender_local_part_in(&["noreply", "no-reply", "website", "forms"])
                .subject_contains_any(&["instant quote", "quote request"]),
        );

        Self { rules }
    }

    /// Detector over a caller-supplied rule list.
    #[must_use]
    pub const fn with_rules(rules: Vec<SourceRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[SourceRule] {
        &self.rules
    }

    /// Classify a message. Returns [`SourceId::Unknown`] when no rule matches.
    #[must_use]
    pub fn detect(&self, from: &str, subject: &str) -> SourceId {
        let sender = Sender::parse(from);
        let subject = subject.to_lowercase();

        let source = self
            .rules
            .iter()
            .find(|rule| rule.matches(sender.as_ref(), &subject))
            .map_or(SourceId::Unknown, SourceRule::source);

        debug!(from, source = source.as_str(), "Detected lead source");
        source
    }
}

static DEFAULT_DETECTOR: LazyLock<SourceDetector> = LazyLock::new(SourceDetector::default);

/// Classify a message with the built-in rules.
#[must_use]
pub fn detect_source(from: &str, subject: &str) -> SourceId {
    DEFAULT_DETECTOR.detect(from, subject)
}
