//! Message bodies flattened into labelled lines.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never shown.
const HIDDEN: &[&str] = &["head", "script", "style", "template", "title", "noscript"];

/// Elements that start and end a line.
const BLOCKS: &[&str] = &[
    "p", "div", "tr", "table", "tbody", "thead", "tfoot", "li", "ul", "ol", "h1", "h2", "h3",
    "h4", "h5", "h6", "section", "article", "header", "footer", "blockquote", "dl", "dt", "dd",
    "hr", "pre", "address", "center", "form",
];

/// The parts of a message an extractor reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageBody<'a> {
    /// Decoded subject line.
    pub subject: &'a str,
    /// Plain-text body.
    pub text: Option<&'a str>,
    /// HTML body.
    pub html: Option<&'a str>,
}

/// A message body as a list of trimmed, non-empty lines.
///
/// The plain-text body comes first, followed by the flattened HTML body, so
/// labels present in both resolve to the plain-text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    subject: String,
    lines: Vec<String>,
}

impl Document {
    /// Flatten a message body.
    #[must_use]
    pub fn new(body: &MessageBody<'_>) -> Self {
        let mut lines: Vec<String> = body.text.map(clean_lines).unwrap_or_default();
        if let Some(html) = body.html {
            lines.extend(clean_lines(&html_to_text(html)));
        }

        Self {
            subject: body.subject.trim().to_string(),
            lines,
        }
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Subject and body as one searchable string.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut text = self.subject.clone();
        for line in &self.lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    /// Value under the first of `labels` that appears in the body.
    ///
    /// Labels are tried in order, so an earlier label wins even when a later
    /// one appears on an earlier line. They compare case-insensitively,
    /// ignoring a trailing `*` or `?`. When the label line has no value, the
    /// next line is taken.
    #[must_use]
    pub fn field(&self, labels: &[&str]) -> Option<&str> {
        labels.iter().find_map(|wanted| self.labelled(wanted))
    }

    fn labelled(&self, wanted: &str) -> Option<&str> {
        self.lines.iter().enumerate().find_map(|(index, line)| {
            let (label, value) = split_label(line)?;
            if !label.eq_ignore_ascii_case(wanted) {
                return None;
            }
            if value.is_empty() {
                self.lines
                    .get(index + 1)
                    .filter(|next| split_label(next).is_none())
                    .map(String::as_str)
            } else {
                Some(value)
            }
        })
    }
}

/// Splits `Label: value` or `Label<TAB>value` at the first separator.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let at = line.find([':', '\t'])?;
    let label = line[..at].trim().trim_end_matches(['*', '?']).trim_end();
    if label.is_empty() || label.len() > 40 {
        return None;
    }
    let value = line[at + 1..].trim_start_matches([':', '\t']).trim();
    Some((label, value))
}

fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.split('\t')
                .map(|cell| cell.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Flattens HTML into text lines.
///
/// Table cells in a row are joined with a tab. Line breaks and block
/// elements become newlines, except inside a cell where they become a
/// comma and a space so the cell stays on its row. Hidden elements are
/// dropped, and character references are decoded by the HTML parser.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    flatten_children(document.root_element(), false, &mut text);
    clean_lines(&text).join("\n")
}

fn flatten_children(element: ElementRef<'_>, in_cell: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    flatten_element(child, in_cell, out);
                }
            }
            _ => {}
        }
    }
}

fn flatten_element(element: ElementRef<'_>, in_cell: bool, out: &mut String) {
    let name = element.value().name();
    if HIDDEN.contains(&name) {
        return;
    }

    match name {
        "br" if in_cell => out.push_str(", "),
        "br" => out.push('\n'),
        "td" | "th" => {
            out.push('\t');
            flatten_children(element, true, out);
        }
        _ if BLOCKS.contains(&name) && in_cell => {
            out.push(' ');
            flatten_children(element, true, out);
            out.push(' ');
        }
        _ if BLOCKS.contains(&name) => {
            out.push('\n');
            flatten_children(element, false, out);
            out.push('\n');
        }
        _ => flatten_children(element, in_cell, out),
    }
}
