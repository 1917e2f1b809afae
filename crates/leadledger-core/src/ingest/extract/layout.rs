use super::ParsedLeadFields;
use crate::ingest::document::Document;
use crate::ingest::fields::{
    detect_property_type, find_email, find_email_excluding, find_phone, mentions,
    normalize_postcode, parse_bedrooms, parse_flag, parse_move_date, parse_postcode,
    split_address, split_name,
};

/// Where to look for an email or phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContactSearch<'a> {
    /// Only values under the layout's own labels.
    LabeledOnly,
    /// Fall back to the first email or phone anywhere in subject and body,
    /// skipping addresses at the given domains as well as the layout's own.
    Anywhere(&'a [&'a str]),
}

type Labels = &'static [&'static str];

/// The labels one source uses for each field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    pub name: Labels,
    pub first_name: Labels,
    pub last_name: Labels,
    pub email: Labels,
    pub phone: Labels,
    pub company: Labels,
    pub from_address: Labels,
    pub from_postcode: Labels,
    pub to_address: Labels,
    pub to_postcode: Labels,
    pub move_date: Labels,
    pub bedrooms: Labels,
    pub property_type: Labels,
    pub notes: Labels,
    pub packing: Labels,
    pub cleaning: Labels,
    /// Comma-separated list of requested services.
    pub services: Labels,
    /// Domains whose addresses belong to the source, never the customer.
    pub own_domains: Labels,
}

impl Layout {
    pub const EMPTY: Self = Self {
        name: &[],
        first_name: &[],
        last_name: &[],
        email: &[],
        phone: &[],
        company: &[],
        from_address: &[],
        from_postcode: &[],
        to_address: &[],
        to_postcode: &[],
        move_date: &[],
        bedrooms: &[],
        property_type: &[],
        notes: &[],
        packing: &[],
        cleaning: &[],
        services: &[],
        own_domains: &[],
    };

    pub fn scrape(&self, doc: &Document, search: ContactSearch<'_>) -> ParsedLeadFields {
        let mut fields = ParsedLeadFields::default();

        if let Some(name) = doc.field(self.name) {
            (fields.first_name, fields.last_name) = split_name(name);
        }
        if let Some(first) = text(doc, self.first_name) {
            fields.first_name = Some(first);
        }
        if let Some(last) = text(doc, self.last_name) {
            fields.last_name = Some(last);
        }

        fields.email = doc.field(self.email).and_then(find_email);
        fields.phone = doc.field(self.phone).and_then(find_phone);
        if let ContactSearch::Anywhere(excluded) = search {
            let all = doc.full_text();
            if fields.email.is_none() {
                let mut domains: Vec<&str> = self.own_domains.to_vec();
                domains.extend_from_slice(excluded);
                fields.email = find_email_excluding(&all, &domains);
            }
            if fields.phone.is_none() {
                fields.phone = find_phone(&all);
            }
        }

        fields.company = text(doc, self.company);

        (fields.from_address, fields.from_postcode) =
            address(doc, self.from_address, self.from_postcode);
        (fields.to_address, fields.to_postcode) = address(doc, self.to_address, self.to_postcode);

        fields.move_date = doc.field(self.move_date).and_then(parse_move_date);

        let bedrooms = doc.field(self.bedrooms);
        let property = doc.field(self.property_type);
        fields.bedrooms = bedrooms
            .and_then(parse_bedrooms)
            .or_else(|| property.and_then(parse_bedrooms));
        fields.property_type = property
            .and_then(detect_property_type)
            .or_else(|| bedrooms.and_then(detect_property_type));

        fields.notes = text(doc, self.notes);

        let requested = doc.field(self.services).unwrap_or_default();
        let notes = fields.notes.as_deref().unwrap_or_default();
        fields.services.packing = doc
            .field(self.packing)
            .and_then(parse_flag)
            .unwrap_or_else(|| mentions(requested, "packing") || mentions(notes, "packing"));
        fields.services.cleaning = doc
            .field(self.cleaning)
            .and_then(parse_flag)
            .unwrap_or_else(|| mentions(requested, "clean") || mentions(notes, "clean"));

        fields
    }
}

fn text(doc: &Document, labels: Labels) -> Option<String> {
    doc.field(labels).map(ToString::to_string)
}

/// Address and postcode, preferring a dedicated postcode field over one
/// split off the end of the address.
fn address(
    doc: &Document,
    address_labels: Labels,
    postcode_labels: Labels,
) -> (Option<String>, Option<String>) {
    let (address, trailing) = doc
        .field(address_labels)
        .map(split_address)
        .unwrap_or_default();

    let postcode = doc
        .field(postcode_labels)
        .map(normalize_postcode)
        .or(trailing)
        .or_else(|| address.as_deref().and_then(parse_postcode));

    (address, postcode)
}
