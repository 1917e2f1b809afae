//! Collaborator traits used by the ingestion pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use super::model::{ActivityKind, Lead, LeadId, NewLead};
use crate::Result;

/// Lead lookup and creation.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Finds a lead by email address (compared trimmed and lowercased).
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>>;

    /// Finds a lead by phone number (compared in normalized digit form).
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>>;

    /// Stores a new lead.
    async fn create(&self, lead: &NewLead) -> Result<Lead>;

    /// Removes a lead and its activity entries.
    async fn delete(&self, id: LeadId) -> Result<()>;
}

/// Append-only audit log attached to leads.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Appends one entry to a lead's log.
    async fn append(&self, lead_id: LeadId, kind: ActivityKind, description: &str) -> Result<()>;
}

#[async_trait]
impl<T: LeadStore + ?Sized> LeadStore for Arc<T> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        (**self).find_by_email(email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        (**self).find_by_phone(phone).await
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead> {
        (**self).create(lead).await
    }

    async fn delete(&self, id: LeadId) -> Result<()> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: ActivityLog + ?Sized> ActivityLog for Arc<T> {
    async fn append(&self, lead_id: LeadId, kind: ActivityKind, description: &str) -> Result<()> {
        (**self).append(lead_id, kind, description).await
    }
}
