//! reallymoving.com lead emails: an HTML table of label and value cells.

use super::{ContactSearch, Extractor, Layout, ParsedLeadFields};
use crate::ingest::document::Document;
use crate::ingest::source::SourceId;

pub(crate) const LAYOUT: Layout = Layout {
    name: &["Customer Name", "Name"],
    email: &["Email Address", "Email"],
    phone: &["Telephone", "Mobile", "Telephone Number", "Phone"],
    from_address: &["Current Address", "Moving From"],
    from_postcode: &["Current Postcode", "From Postcode"],
    to_address: &["New Address", "Moving To"],
    to_postcode: &["New Postcode", "To Postcode"],
    move_date: &["Moving Date", "Move Date"],
    bedrooms: &["Bedrooms"],
    property_type: &["Property Size", "Property Type"],
    notes: &["Comments", "Additional Comments"],
    packing: &["Packing Service", "Packing"],
    cleaning: &["Cleaning Service", "Cleaning"],
    own_domains: &["reallymoving.com"],
    ..Layout::EMPTY
};

pub(crate) const EXTRACTOR: Extractor = Extractor::new(SourceId::ReallyMoving, scrape);

const REFERENCE: &[&str] = &["Reference", "Lead Reference", "Ref"];

fn scrape(doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
    let mut fields = LAYOUT.scrape(doc, search);

    if let Some(reference) = doc.field(REFERENCE) {
        fields.append_note(&format!("ReallyMoving reference: {reference}"));
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

    const HTML: &str = r#"<html><body>
<h2>New removal quote request</h2>
<table border="1">
  <tr><td>Reference</td><td>RM-558812</td></tr>
  <tr><td>Customer Name</td><td>Sarah O'Neill</td></tr>
  <tr><td>Email Address</td><td>Sarah.ONeill@Example.co.uk</td></tr>
  <tr><td>Telephone</td><td>0161-496-0123</td></tr>
  <tr><td>Current Address</td><td>Flat 2, 9 Canal Street, Manchester M1 3HE</td></tr>
  <tr><td>Current Postcode</td><td>m1 3he</td></tr>
  <tr><td>New Address</td><td>22 Park Road, Stockport</td></tr>
  <tr><td>New Postcode</td><td>SK4 2BT</td></tr>
  <tr><td>Moving Date</td><td>Friday, 3rd April 2026</td></tr>
  <tr><td>Property Size</td><td>3 Bedroom House</td></tr>
  <tr><td>Packing Service</td><td>Yes</td></tr>
  <tr><td>Cleaning Service</td><td>No</td></tr>
  <tr><td>Comments</td><td>Piano &amp; garden shed</td></tr>
</table>
<p>Sent by <a href="mailto:leads@reallymoving.com">leads@reallymoving.com</a></p>
</body></html>"#;

    #[test]
    fn test_table_layout() {
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "reallymoving.com lead",
                text: None,
                html: Some(HTML),
            })
            .unwrap();
        let fields = lead.fields;

        assert_eq!(fields.first_name.as_deref(), Some("Sarah"));
        assert_eq!(fields.last_name.as_deref(), Some("O'Neill"));
        assert_eq!(fields.email.as_deref(), Some("sarah.oneill@example.co.uk"));
        assert_eq!(fields.phone.as_deref(), Some("01614960123"));
        assert_eq!(
            fields.from_address.as_deref(),
            Some("Flat 2, 9 Canal Street, Manchester")
        );
        assert_eq!(fields.from_postcode.as_deref(), Some("M1 3HE"));
        assert_eq!(fields.to_address.as_deref(), Some("22 Park Road, Stockport"));
        assert_eq!(fields.to_postcode.as_deref(), Some("SK4 2BT"));
        assert_eq!(fields.move_date, NaiveDate::from_ymd_opt(2026, 4, 3));
        assert_eq!(fields.bedrooms, Some(3));
        assert_eq!(fields.property_type, Some(PropertyType::House));
        assert!(fields.services.packing);
        assert!(!fields.services.cleaning);
        assert_eq!(
            fields.notes.as_deref(),
            Some("Piano & garden shed\nReallyMoving reference: RM-558812")
        );
    }

    #[test]
    fn test_apostrophe_email_and_named_entities() {
        let html = "<table>\
            <tr><td>Customer Name</td><td>Se&aacute;n O&rsquo;Brien</td></tr>\
            <tr><td>Email Address</td><td>sean.o'brien@example.ie</td></tr>\
            <tr><td>Comments</td><td>2&times; wardrobes&hellip;</td></tr></table>";
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "Lead",
                text: None,
                html: Some(html),
            })
            .unwrap();

        assert_eq!(lead.fields.email.as_deref(), Some("sean.o'brien@example.ie"));
        assert_eq!(lead.fields.first_name.as_deref(), Some("Se\u{e1}n"));
        assert_eq!(lead.fields.last_name.as_deref(), Some("O\u{2019}Brien"));
        assert_eq!(lead.fields.notes.as_deref(), Some("2\u{d7} wardrobes\u{2026}"));
    }

    #[test]
    fn test_unparseable_date_left_empty() {
        let html = "<table><tr><td>Email Address</td><td>a@b.com</td></tr>\
                    <tr><td>Moving Date</td><td>ASAP</td></tr></table>";
        let lead = EXTRACTOR
            .extract(&MessageBody {
                subject: "",
                text: None,
                html: Some(html),
            })
            .unwrap();
        assert_eq!(lead.fields.move_date, None);
    }
}
