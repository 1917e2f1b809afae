//! Best-effort extraction for unrecognised senders.
//!
//! Forwarded or re-branded aggregator emails often keep their original
//! layout, so every dedicated layout is tried first using labelled contacts
//! only. The first one that finds a contact wins. Failing that, a layout of
//! common labels runs with a scan of the whole subject and body.

use tracing::debug;

use super::{ContactSearch, Extractor, Layout, ParsedLeadFields};
use crate::ingest::document::Document;
use crate::ingest::source::SourceId;

const LAYOUT: Layout = Layout {
    name: &["Name", "Full Name", "Customer Name", "Contact Name", "Your Name"],
    first_name: &["First Name"],
    last_name: &["Last Name", "Surname"],
    email: &["Email", "Email Address", "E-mail"],
    phone: &["Phone", "Telephone", "Mobile", "Tel", "Phone Number", "Contact Number"],
    company: &["Company"],
    from_address: &["Moving From", "Current Address", "Collection Address"],
    from_postcode: &["From Postcode", "Current Postcode"],
    to_address: &["Moving To", "New Address", "Delivery Address"],
    to_postcode: &["To Postcode", "New Postcode"],
    move_date: &["Move Date", "Moving Date", "Date of Move"],
    bedrooms: &["Bedrooms", "Number of Bedrooms"],
    property_type: &["Property Type", "Property", "Property Size"],
    notes: &["Notes", "Message", "Comments", "Additional Information"],
    packing: &["Packing"],
    cleaning: &["Cleaning"],
    ..Layout::EMPTY
};

pub(crate) const EXTRACTOR: Extractor = Extractor::new(SourceId::Unknown, scrape);

fn scrape(doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
    let dedicated = SourceId::KNOWN
        .iter()
        .filter_map(|source| source.extractor())
        .find_map(|extractor| {
            let fields = extractor.scrape(doc, ContactSearch::LabeledOnly);
            fields.has_contact().then(|| (extractor.source(), fields))
        });

    if let Some((layout, fields)) = dedicated {
        debug!(layout = layout.as_str(), "Unknown sender matched a known layout");
        return fields;
    }

    LAYOUT.scrape(doc, search)
}
