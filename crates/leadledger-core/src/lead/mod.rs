//! Leads and their activity log.
//!
//! A lead is the canonical record created from an inbound enquiry. Storage
//! is split behind two collaborator traits so the ingestion pipeline can be
//! driven against any backend:
//!
//! - [`LeadStore`]: look up existing leads and create new ones
//! - [`ActivityLog`]: append audit entries to a lead
//!
//! [`LeadRepository`] implements both over `SQLite`.

mod model;
mod repository;
mod store;

pub use model::{Activity, ActivityKind, Lead, LeadId, LeadStatus, NewLead, PropertyType};
pub use repository::LeadRepository;
pub use store::{ActivityLog, LeadStore};
