//! Per-source field extraction.
//!
//! Each lead source gets an [`Extractor`]: a source tag plus a scrape
//! function that reads [`ParsedLeadFields`] from a flattened [`Document`].
//! Most of the work is shared through [`Layout`], a table of the labels a
//! source uses for each field; source modules only add their quirks.

pub(crate) mod compare_my_move;
pub(crate) mod generic;
pub(crate) mod get_a_mover;
mod layout;
pub(crate) mod really_moving;
pub(crate) mod website;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::{Document, MessageBody};
use super::source::SourceId;
use crate::lead::PropertyType;

pub(crate) use layout::{ContactSearch, Layout};

/// Optional services requested alongside the move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFlags {
    /// Packing service requested.
    pub packing: bool,
    /// End-of-tenancy or property cleaning requested.
    pub cleaning: bool,
}

/// Structured fields read from an enquiry.
///
/// Emails are lowercase, phones are national digit strings and postcodes
/// are in canonical spaced form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLeadFields {
    /// Contact email address.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Company name, for commercial moves.
    pub company: Option<String>,
    /// Moving-from address, without its postcode.
    pub from_address: Option<String>,
    /// Moving-from postcode.
    pub from_postcode: Option<String>,
    /// Moving-to address, without its postcode.
    pub to_address: Option<String>,
    /// Moving-to postcode.
    pub to_postcode: Option<String>,
    /// Requested move date.
    pub move_date: Option<NaiveDate>,
    /// Number of bedrooms (0 for a studio).
    pub bedrooms: Option<u8>,
    /// Kind of property.
    pub property_type: Option<PropertyType>,
    /// Free-text notes from the customer or the source.
    pub notes: Option<String>,
    /// Requested extra services.
    pub services: ServiceFlags,
}

impl ParsedLeadFields {
    /// Whether an email or phone number is present.
    #[must_use]
    pub const fn has_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }

    /// First and last name joined, if either is known.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }

    /// Append a line to the notes.
    pub(crate) fn append_note(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match &mut self.notes {
            Some(notes) => {
                notes.push('\n');
                notes.push_str(line);
            }
            None => self.notes = Some(line.to_string()),
        }
    }
}

/// A successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLead {
    /// Source the fields were read as.
    pub source: SourceId,
    /// Extracted fields.
    pub fields: ParsedLeadFields,
}

/// Why a message could not be turned into a lead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Neither an email address nor a phone number was found.
    #[error("no contact identifier found")]
    NoContactIdentifier(SourceId),
}

impl ParseFailure {
    /// Source the message was read as.
    #[must_use]
    pub const fn lead_source(&self) -> SourceId {
        match self {
            Self::NoContactIdentifier(source) => *source,
        }
    }
}

/// Outcome of parsing one message.
pub type ParseResult = Result<ParsedLead, ParseFailure>;

type ScrapeFn = fn(&Document, ContactSearch<'_>) -> ParsedLeadFields;

/// Field extraction for one source.
#[derive(Clone, Copy)]
pub struct Extractor {
    source: SourceId,
    scrape: ScrapeFn,
}

impl Extractor {
    pub(crate) const fn new(source: SourceId, scrape: ScrapeFn) -> Self {
        Self { source, scrape }
    }

    /// Source this extractor reads.
    #[must_use]
    pub const fn source(&self) -> SourceId {
        self.source
    }

    /// Extract lead fields from a message body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::NoContactIdentifier`] when neither an email
    /// nor a phone number can be found.
    pub fn extract(&self, body: &MessageBody<'_>) -> ParseResult {
        self.extract_excluding(body, &[])
    }

    /// Like [`extract`](Self::extract), but an unlabelled email address at
    /// one of `own_domains` (or a subdomain) is never taken as the contact.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::NoContactIdentifier`] when neither an email
    /// nor a phone number can be found.
    pub fn extract_excluding(&self, body: &MessageBody<'_>, own_domains: &[&str]) -> ParseResult {
        let document = Document::new(body);
        finish(
            self.source,
            self.scrape(&document, ContactSearch::Anywhere(own_domains)),
        )
    }

    pub(crate) fn scrape(
        &self,
        document: &Document,
        search: ContactSearch<'_>,
    ) -> ParsedLeadFields {
        (self.scrape)(document, search)
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Extractor {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Extractor {}

/// Best-effort extractor for messages from unrecognised senders.
pub const GENERIC: Extractor = generic::EXTRACTOR;

fn finish(source: SourceId, fields: ParsedLeadFields) -> ParseResult {
    if fields.has_contact() {
        Ok(ParsedLead { source, fields })
    } else {
        Err(ParseFailure::NoContactIdentifier(source))
    }
}
