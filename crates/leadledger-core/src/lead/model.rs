//! Lead and activity data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::{ParsedLead, ParsedLeadFields, SourceId};

/// Unique identifier for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub i64);

impl LeadId {
    /// Create a new lead ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a lead is in the staff review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Created by ingestion, waiting for a member of staff.
    #[default]
    PendingReview,
    /// Accepted by staff; the enquiry is being worked.
    Accepted,
    /// Rejected by staff (spam, out of area, duplicate enquiry).
    Rejected,
}

impl LeadStatus {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            _ => Self::PendingReview,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Kind of property being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// House of any kind (detached, terraced, cottage).
    House,
    /// Flat, apartment or studio.
    Flat,
    /// Bungalow.
    Bungalow,
    /// Maisonette.
    Maisonette,
    /// Office or other commercial premises.
    Office,
    /// Storage unit or container.
    Storage,
}

impl PropertyType {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "house" => Some(Self::House),
            "flat" => Some(Self::Flat),
            "bungalow" => Some(Self::Bungalow),
            "maisonette" => Some(Self::Maisonette),
            "office" => Some(Self::Office),
            "storage" => Some(Self::Storage),
            _ => None,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Flat => "flat",
            Self::Bungalow => "bungalow",
            Self::Maisonette => "maisonette",
            Self::Office => "office",
            Self::Storage => "storage",
        }
    }
}

/// A lead ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    /// Which source the enquiry came from.
    pub source: SourceId,
    /// Initial workflow status.
    pub status: LeadStatus,
    /// Extracted enquiry details.
    pub details: ParsedLeadFields,
}

impl From<ParsedLead> for NewLead {
    fn from(parsed: ParsedLead) -> Self {
        Self {
            source: parsed.source,
            status: LeadStatus::PendingReview,
            details: parsed.fields,
        }
    }
}

/// A stored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    /// Unique identifier.
    pub id: LeadId,
    /// Workflow status.
    pub status: LeadStatus,
    /// Which source the enquiry came from.
    pub source: SourceId,
    /// Enquiry details.
    #[serde(flatten)]
    pub details: ParsedLeadFields,
    /// When the lead was created.
    pub created_at: DateTime<Utc>,
    /// When the lead was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Contact name for display, falling back to the email or phone.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.details
            .full_name()
            .or_else(|| self.details.email.clone())
            .or_else(|| self.details.phone.clone())
            .unwrap_or_else(|| format!("Lead #{}", self.id))
    }

    /// Check if this lead is waiting for review.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, LeadStatus::PendingReview)
    }
}

/// Kind of activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// The lead was created (by ingestion or by hand).
    LeadCreated,
    /// The workflow status changed.
    StatusChange,
    /// Phone call with the customer.
    Call,
    /// Email with the customer.
    Email,
    /// Text message with the customer.
    Sms,
    /// Free-form staff note.
    Note,
}

impl ActivityKind {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "lead_created" => Self::LeadCreated,
            "status_change" => Self::StatusChange,
            "call" => Self::Call,
            "email" => Self::Email,
            "sms" => Self::Sms,
            _ => Self::Note,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeadCreated => "lead_created",
            Self::StatusChange => "status_change",
            Self::Call => "call",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Note => "note",
        }
    }
}

/// An audit-log entry attached to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    /// Unique identifier.
    pub id: i64,
    /// Lead this entry belongs to.
    pub lead_id: LeadId,
    /// Entry kind.
    pub kind: ActivityKind,
    /// Human-readable description.
    pub description: String,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}
