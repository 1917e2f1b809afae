//! Email lead ingestion.
//!
//! Messages flow through three stages:
//!
//! 1. [`SourceDetector`] names the source from sender and subject.
//! 2. [`ParserRegistry`] runs that source's [`Extractor`] (or the generic
//!    fallback) to produce [`ParsedLeadFields`].
//! 3. [`IngestionPipeline`] de-duplicates against stored leads, creates new
//!    ones with an activity entry and marks each message processed.

mod document;
mod extract;
pub mod fields;
mod pipeline;
mod registry;
mod source;

pub use document::{Document, MessageBody, html_to_text};
pub use extract::{
    Extractor, GENERIC, ParseFailure, ParseResult, ParsedLead, ParsedLeadFields, ServiceFlags,
};
pub use pipeline::{CreatedLead, IngestionPipeline, IngestionReport};
pub use registry::ParserRegistry;
pub use source::{SourceDetector, SourceId, SourceRule, detect_source};
