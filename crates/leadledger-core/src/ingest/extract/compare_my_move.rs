//! comparemymove.com lead emails.
//!
//! Plain-text `Label: Value` lines. The customer's name is often only in
//! the subject: "Removals lead from comparemymove.com (John Smith)".

use std::sync::LazyLock;

use regex::Regex;

use super::{ContactSearch, Extractor, Layout, ParsedLeadFields};
use crate::ingest::document::Document;
use crate::ingest::fields::{pattern, split_name};
use crate::ingest::source::SourceId;

pub(crate) const LAYOUT: Layout = Layout {
    name: &["Name", "Customer", "Customer name"],
    email: &["Email", "Email address", "E-mail"],
    phone: &["Phone", "Telephone", "Tel", "Mobile", "Phone number"],
    from_address: &["Moving from", "Current address"],
    from_postcode: &["From postcode", "Moving from postcode"],
    to_address: &["Moving to", "New address"],
    to_postcode: &["To postcode", "Moving to postcode"],
    move_date: &["Move date", "Moving date", "Date of move"],
    bedrooms: &["Bedrooms", "Number of bedrooms"],
    property_type: &["Property type", "Property"],
    notes: &["Additional information", "Notes", "Comments"],
    packing: &["Packing", "Packing required"],
    cleaning: &["Cleaning", "Cleaning required"],
    own_domains: &["comparemymove.com"],
    ..Layout::EMPTY
};

pub(crate) const EXTRACTOR: Extractor = Extractor::new(SourceId::CompareMyMove, scrape);

static SUBJECT_NAME: LazyLock<Regex> = LazyLock::new(|| pattern(r"\(([^()]+)\)\s*$"));

fn scrape(doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
    let mut fields = LAYOUT.scrape(doc, search);

    let named = fields.first_name.is_some() || fields.last_name.is_some();
    if let Some(caps) = SUBJECT_NAME.captures(doc.subject()).filter(|_| !named) {
        (fields.first_name, fields.last_name) = split_name(&caps[1]);
    }

    fields
}
