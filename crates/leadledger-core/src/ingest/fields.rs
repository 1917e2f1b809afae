//! Field-level patterns and normalizers.
//!
//! Every function here is pure: a string slice in, an optional typed value
//! out. Extractors compose them; nothing in this module knows about a
//! particular lead source.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::lead::PropertyType;

/// Compiles a built-in pattern.
#[allow(clippy::expect_used)]
pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in pattern compiles")
}

/// Local part uses the RFC 5322 `atext` set plus dots.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)[a-z0-9.!#$%&'*+/=?^_`{|}~\-]+@(?:[a-z0-9\-]+\.)+[a-z]{2,}")
});

static EMAIL_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~\-]+@(?:[a-z0-9\-]+\.)+[a-z]{2,}$")
});

/// Characters that wrap an address in prose but never start or end one.
const EMAIL_WRAPPERS: &[char] = &['\'', '"', '`', '<', '>', '(', ')', '[', ']', '.', ',', ';', ':'];

/// Digits with the separators people type into phone fields.
static PHONE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\+?\(?\d[\d \t().\-]{7,18}\d"));

static POSTCODE_EXACT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([A-Z]{1,2}[0-9][A-Z0-9]?)([0-9][A-Z]{2})$"));

static POSTCODE_ANY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b[A-Z]{1,2}[0-9][A-Z0-9]?\s*[0-9][A-Z]{2}\b"));

static POSTCODE_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b([A-Z]{1,2}[0-9][A-Z0-9]?)\s*([0-9][A-Z]{2})[\s.,]*$"));

static DATE_ISO: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"));

static DATE_DAY_FIRST: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"));

static DATE_LONG: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]{3,9})\.?,?\s+(\d{4})\b")
});

static DATE_MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
});

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\s*(\d{1,2})\b"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const NUMBER_WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

const TITLES: [&str; 7] = ["mr", "mrs", "ms", "miss", "mx", "dr", "prof"];

/// Trims, lowercases and validates an email address.
///
/// A `mailto:` prefix is accepted. Returns `None` unless the whole value is
/// email-shaped.
#[must_use]
pub fn normalize_email(value: &str) -> Option<String> {
    let value = value.trim();
    let value = value
        .strip_prefix("mailto:")
        .or_else(|| value.strip_prefix("MAILTO:"))
        .unwrap_or(value)
        .trim()
        .trim_matches(EMAIL_WRAPPERS)
        .to_lowercase();
    EMAIL_EXACT.is_match(&value).then_some(value)
}

/// First email-shaped token in `text`, normalized.
#[must_use]
pub fn find_email(text: &str) -> Option<String> {
    find_email_excluding(text, &[])
}

/// First email-shaped token whose domain is not one of `excluded_domains`
/// (or a subdomain of one), normalized.
#[must_use]
pub fn find_email_excluding(text: &str, excluded_domains: &[&str]) -> Option<String> {
    EMAIL
        .find_iter(text)
        .filter_map(|m| normalize_email(m.as_str()))
        .find(|email| {
            let domain = email.rsplit('@').next().unwrap_or_default();
            !excluded_domains.iter().any(|excluded| domain_matches(domain, excluded))
        })
}

/// Whether `domain` is `expected` or one of its subdomains.
#[must_use]
pub fn domain_matches(domain: &str, expected: &str) -> bool {
    let domain = domain.trim().to_ascii_lowercase();
    let expected = expected.trim().to_ascii_lowercase();
    domain == expected || domain.ends_with(&format!(".{expected}"))
}

/// Normalizes a UK phone number to its national digit form.
///
/// Spaces, dashes, dots and parentheses are stripped; an international
/// `+44`/`0044` prefix (with or without a `(0)` trunk marker) becomes a
/// leading `0`. Returns `None` unless the result is a 10 or 11 digit number
/// starting with `0`.
#[must_use]
pub fn normalize_phone(value: &str) -> Option<String> {
    let value = value.trim();
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let international = value.starts_with('+') || digits.starts_with("0044");

    let national = if international {
        let rest = digits.strip_prefix("00").unwrap_or(&digits);
        let rest = rest.strip_prefix("44")?;
        format!("0{}", rest.trim_start_matches('0'))
    } else if digits.len() == 12 && digits.starts_with("44") {
        format!("0{}", &digits[2..])
    } else {
        digits
    };

    (national.starts_with('0') && (10..=11).contains(&national.len())).then_some(national)
}

/// First valid UK phone number in `text`, normalized.
#[must_use]
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_CANDIDATE
        .find_iter(text)
        .find_map(|m| normalize_phone(m.as_str()))
}

/// Canonical postcode form: uppercase, inner whitespace removed, and a single
/// space before the inward code when the value is a valid UK postcode.
///
/// Idempotent for every input.
#[must_use]
pub fn normalize_postcode(value: &str) -> String {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    POSTCODE_EXACT.captures(&compact).map_or_else(
        || compact.clone(),
        |caps| format!("{} {}", &caps[1], &caps[2]),
    )
}

/// First UK postcode in `text`, normalized.
#[must_use]
pub fn parse_postcode(text: &str) -> Option<String> {
    POSTCODE_ANY
        .find(text)
        .map(|m| normalize_postcode(m.as_str()))
}

/// Splits a trailing postcode off an address line.
///
/// `"45 High Street, London, NW1 2AB"` becomes
/// `(Some("45 High Street, London"), Some("NW1 2AB"))`.
#[must_use]
pub fn split_address(value: &str) -> (Option<String>, Option<String>) {
    let value = value.trim();
    let Some(caps) = POSTCODE_TRAILING.captures(value) else {
        return (non_empty(value), None);
    };

    let start = caps.get(0).map_or(value.len(), |m| m.start());
    let address = value[..start].trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    let postcode = normalize_postcode(&format!("{}{}", &caps[1], &caps[2]));
    (non_empty(address), Some(postcode))
}

/// Parses a move date in any of the layouts lead sources use.
///
/// Accepts ISO `YYYY-MM-DD`, day-first numeric dates separated by `/`, `-`
/// or `.` (two-digit years are 20xx), `15 March 2026` with optional weekday
/// and ordinal suffix, and `March 15, 2026`. Returns `None` for anything
/// else ("ASAP", "flexible", impossible dates).
#[must_use]
pub fn parse_move_date(value: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_ISO.captures(value) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = DATE_DAY_FIRST.captures(value) {
        let year = if caps[3].len() == 2 {
            format!("20{}", &caps[3])
        } else {
            caps[3].to_string()
        };
        return ymd(&year, &caps[2], &caps[1]);
    }

    let long = DATE_LONG.captures_iter(value).find_map(|caps| {
        let month = month_number(&caps[2])?;
        ymd(&caps[3], &month.to_string(), &caps[1])
    });
    if long.is_some() {
        return long;
    }

    DATE_MONTH_FIRST.captures_iter(value).find_map(|caps| {
        let month = month_number(&caps[1])?;
        ymd(&caps[3], &month.to_string(), &caps[2])
    })
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Month number for a full or abbreviated (3+ letters) English month name.
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|month| name.len() >= 3 && month.starts_with(&name))
        .and_then(|index| u32::try_from(index + 1).ok())
}

/// Bedroom count from a leading integer token ("3 bed house" → 3).
///
/// Spelled-out counts ("two bedroom flat") and studios (0) are recognised
/// too.
#[must_use]
pub fn parse_bedrooms(value: &str) -> Option<u8> {
    if let Some(caps) = LEADING_NUMBER.captures(value) {
        return caps[1].parse().ok();
    }

    let lower = value.trim().to_lowercase();
    if lower.starts_with("studio") {
        return Some(0);
    }
    let first_word = lower.split(|c: char| !c.is_alphabetic()).next()?;
    NUMBER_WORDS
        .iter()
        .position(|word| *word == first_word)
        .and_then(|index| u8::try_from(index + 1).ok())
}

/// Property type from keywords in free text.
#[must_use]
pub fn detect_property_type(value: &str) -> Option<PropertyType> {
    let lower = value.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

    if has(&["bungalow"]) {
        Some(PropertyType::Bungalow)
    } else if has(&["maisonette"]) {
        Some(PropertyType::Maisonette)
    } else if has(&["flat", "apartment", "studio", "penthouse"]) {
        Some(PropertyType::Flat)
    } else if has(&["office", "commercial", "business"]) {
        Some(PropertyType::Office)
    } else if has(&["storage", "container"]) {
        Some(PropertyType::Storage)
    } else if has(&["house", "townhouse", "cottage", "detached", "terrace", "terraced"]) {
        Some(PropertyType::House)
    } else {
        None
    }
}

/// Splits a full name at the first whitespace boundary.
///
/// A leading title ("Mr", "Mrs", "Dr.") is dropped. A single word yields
/// only a first name.
#[must_use]
pub fn split_name(value: &str) -> (Option<String>, Option<String>) {
    let mut words: Vec<&str> = value.split_whitespace().collect();
    if words.len() > 1 {
        let first = words[0].trim_end_matches('.').to_lowercase();
        if TITLES.contains(&first.as_str()) {
            words.remove(0);
        }
    }

    match words.split_first() {
        None => (None, None),
        Some((first, [])) => (Some((*first).to_string()), None),
        Some((first, rest)) => (Some((*first).to_string()), Some(rest.join(" "))),
    }
}

/// Reads a yes/no answer ("Yes", "Y", "Required", "No", "Not required").
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    let lower = value.trim().to_lowercase();
    let first = lower
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    match first {
        "yes" | "y" | "true" | "required" | "1" => Some(true),
        "no" | "n" | "not" | "none" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Case-insensitive keyword presence.
#[must_use]
pub fn mentions(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
