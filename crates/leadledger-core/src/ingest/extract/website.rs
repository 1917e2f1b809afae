//! The company's own instant-quote form.

use super::{ContactSearch, Extractor, Layout, ParsedLeadFields};
use crate::ingest::document::Document;
use crate::ingest::source::SourceId;

pub(crate) const LAYOUT: Layout = Layout {
    name: &["Full Name", "Name", "Your Name"],
    company: &["Company", "Company Name"],
    email: &["Email", "Email Address", "Your Email"],
    phone: &["Phone", "Phone Number", "Telephone", "Your Phone"],
    from_address: &["From Address", "Moving From"],
    from_postcode: &["From Postcode"],
    to_address: &["To Address", "Moving To"],
    to_postcode: &["To Postcode"],
    move_date: &["Moving Date", "Move Date", "Preferred Date"],
    bedrooms: &["Bedrooms"],
    property_type: &["Property Type"],
    notes: &["Message", "Additional Information"],
    packing: &["Packing Required", "Packing"],
    cleaning: &["Cleaning Required", "Cleaning"],
    ..Layout::EMPTY
};

pub(crate) const EXTRACTOR: Extractor = Extractor::new(SourceId::Website, scrape);

const QUOTE_REFERENCE: &[&str] = &["Quote Reference", "Quote Ref", "Reference"];
const ESTIMATE: &[&str] = &["Estimate", "Instant Quote", "Quoted Price"];

fn scrape(doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
    let mut fields = LAYOUT.scrape(doc, search);

    if let Some(reference) = doc.field(QUOTE_REFERENCE) {
        fields.append_note(&format!("Quote reference: {reference}"));
    }
    if let Some(estimate) = doc.field(ESTIMATE) {
        fields.append_note(&format!("Instant quote shown: {estimate}"));
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

    const TEXT: &str = "\
New instant quote submitted on the website

Quote Reference: Q-1042
Full Name: Alex Morgan
Company: Morgan Design Ltd
Email: ALEX@morgandesign.example
Phone: 020 7946 0321
From Address: Unit 4, 18 Brick Lane, London
From Postcode: e1 6ru
To Address: 2 Station Road, Reading
To Postcode: RG1 1LX
Moving Date: 2026-06-30
Property Type: Office
Bedrooms: 0
Packing Required: Yes
Cleaning Required: No
Estimate: £1,450
Message: 12 desks and a server rack
";

    #[test]
    fn test_form_layout() {
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "New Instant Quote",
                text: Some(TEXT),
                html: None,
            })
            .unwrap();
        let fields = lead.fields;

        assert_eq!(fields.first_name.as_deref(), Some("Alex"));
        assert_eq!(fields.last_name.as_deref(), Some("Morgan"));
        assert_eq!(fields.company.as_deref(), Some("Morgan Design Ltd"));
        assert_eq!(fields.email.as_deref(), Some("alex@morgandesign.example"));
        assert_eq!(fields.phone.as_deref(), Some("02079460321"));
        assert_eq!(fields.from_address.as_deref(), Some("Unit 4, 18 Brick Lane, London"));
        assert_eq!(fields.from_postcode.as_deref(), Some("E1 6RU"));
        assert_eq!(fields.to_postcode.as_deref(), Some("RG1 1LX"));
        assert_eq!(fields.move_date, NaiveDate::from_ymd_opt(2026, 6, 30));
        assert_eq!(fields.property_type, Some(PropertyType::Office));
        assert_eq!(fields.bedrooms, Some(0));
        assert!(fields.services.packing);
        assert!(!fields.services.cleaning);
        assert_eq!(
            fields.notes.as_deref(),
            Some(
                "12 desks and a server rack\nQuote reference: Q-1042\nInstant quote shown: £1,450"
            )
        );
    }

    #[test]
    fn test_day_first_date() {
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "Quote request",
                text: Some("Email: a@b.com\nMoving Date: 01/07/26"),
                html: None,
            })
            .unwrap();
        assert_eq!(lead.fields.move_date, NaiveDate::from_ymd_opt(2026, 7, 1));
    }
}
