//! getamover.co.uk job notifications: one `<p>Label: Value</p>` per field.

use super::{ContactSearch, Extractor, Layout, ParsedLeadFields};
use crate::ingest::document::Document;
use crate::ingest::source::SourceId;

pub(crate) const LAYOUT: Layout = Layout {
    name: &["Name", "Customer"],
    first_name: &["First name"],
    last_name: &["Last name", "Surname"],
    email: &["Email"],
    phone: &["Mobile", "Phone", "Telephone"],
    from_address: &["Collection address", "Collection"],
    from_postcode: &["Collection postcode"],
    to_address: &["Delivery address", "Delivery"],
    to_postcode: &["Delivery postcode"],
    move_date: &["Move date", "Date"],
    bedrooms: &["Number of bedrooms", "Bedrooms"],
    property_type: &["Property", "Property type"],
    notes: &["Message", "Notes"],
    services: &["Extras", "Additional services"],
    own_domains: &["getamover.co.uk"],
    ..Layout::EMPTY
};

pub(crate) const EXTRACTOR: Extractor = Extractor::new(SourceId::GetAMover, scrape);

const JOB_ID: &[&str] = &["Job ID", "Job reference", "Job number"];

fn scrape(doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
    let mut fields = LAYOUT.scrape(doc, search);

    if let Some(job) = doc.field(JOB_ID) {
        fields.append_note(&format!("GetAMover job: {job}"));
    }

    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ingest::document::MessageBody;
    use crate::lead::PropertyType;

    const HTML: &str = "\
<div class=\"job\">
<p>Job ID: GAM-20931</p>
<p>First name: Priya</p>
<p>Last name: Patel</p>
<p>Email: <a href=\"mailto:priya.patel@example.com\">priya.patel@example.com</a></p>
<p>Mobile: 07911 123456</p>
<p>Collection address: 7 Elm Close, Bristol, BS8 1TH</p>
<p>Delivery address: 31 Quay Street, Bath BA1 1AA</p>
<p>Date: 22-05-2026</p>
<p>Number of bedrooms: Two</p>
<p>Property: Flat (2nd floor, no lift)</p>
<p>Extras: Packing, Cleaning</p>
<p>Message: Please call evenings</p>
</div>";

    #[test]
    fn test_paragraph_layout() {
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "New job available",
                text: None,
                html: Some(HTML),
            })
            .unwrap();
        let fields = lead.fields;

        assert_eq!(lead.source, SourceId::GetAMover);
        assert_eq!(fields.first_name.as_deref(), Some("Priya"));
        assert_eq!(fields.last_name.as_deref(), Some("Patel"));
        assert_eq!(fields.email.as_deref(), Some("priya.patel@example.com"));
        assert_eq!(fields.phone.as_deref(), Some("07911123456"));
        assert_eq!(fields.from_postcode.as_deref(), Some("BS8 1TH"));
        assert_eq!(fields.to_address.as_deref(), Some("31 Quay Street, Bath"));
        assert_eq!(fields.to_postcode.as_deref(), Some("BA1 1AA"));
        assert_eq!(fields.move_date, NaiveDate::from_ymd_opt(2026, 5, 22));
        assert_eq!(fields.bedrooms, Some(2));
        assert_eq!(fields.property_type, Some(PropertyType::Flat));
        assert!(fields.services.packing);
        assert!(fields.services.cleaning);
        assert_eq!(
            fields.notes.as_deref(),
            Some("Please call evenings\nGetAMover job: GAM-20931")
        );
    }

    #[test]
    fn test_phone_only_lead() {
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "New job",
                text: None,
                html: Some("<p>First name: Sam</p><p>Phone: 0117 496 0999</p>"),
            })
            .unwrap();
        assert_eq!(lead.fields.email, None);
        assert_eq!(lead.fields.phone.as_deref(), Some("01174960999"));
        assert!(!lead.fields.services.packing);
    }
}
