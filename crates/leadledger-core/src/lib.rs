//! # leadledger-core
//!
//! Email lead ingestion for a removals CRM.
//!
//! This crate provides:
//! - Lead source detection from sender and subject
//! - Per-source field extraction (`CompareMyMove`, `ReallyMoving`,
//!   `GetAMover`, the company website form) with a generic fallback
//! - The ingestion pipeline: parse, de-duplicate, create, mark processed
//! - Lead and activity storage (`SQLite`)
//! - Maildir and in-memory mailboxes
//! - Configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod ingest;
pub mod lead;
pub mod mailbox;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use ingest::{
    CreatedLead, Extractor, IngestionPipeline, IngestionReport, ParseFailure, ParseResult,
    ParsedLead, ParsedLeadFields, ParserRegistry, ServiceFlags, SourceDetector, SourceId,
    SourceRule, detect_source,
};
pub use lead::{
    Activity, ActivityKind, ActivityLog, Lead, LeadId, LeadRepository, LeadStatus, LeadStore,
    NewLead, PropertyType,
};
pub use mailbox::{InboundMessage, MaildirMailbox, Mailbox, MemoryMailbox, MessageId};
