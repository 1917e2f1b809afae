//! Mailbox-to-lead ingestion runs.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::extract::ParsedLead;
use super::registry::ParserRegistry;
use super::source::SourceId;
use crate::Result;
use crate::lead::{ActivityKind, ActivityLog, LeadId, LeadStore, NewLead};
use crate::mailbox::{InboundMessage, Mailbox};

/// A lead created during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLead {
    /// Stored lead ID.
    pub id: LeadId,
    /// Contact email, if the lead has one.
    pub email: Option<String>,
    /// Source the enquiry came from.
    pub source: SourceId,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Messages handled.
    pub processed: usize,
    /// Leads created.
    pub created: usize,
    /// Messages that did not parse or duplicated an existing lead.
    pub skipped: usize,
    /// Messages whose lead could not be stored.
    pub failed: usize,
    /// One `"<message id>: <reason>"` entry per problem.
    pub errors: Vec<String>,
    /// Leads created, in message order.
    pub leads: Vec<CreatedLead>,
}

enum Outcome {
    Created(CreatedLead),
    Duplicate(LeadId),
    Unparsed(String),
    Failed(String),
}

/// Turns unprocessed mailbox messages into leads.
///
/// Runs are serialized: a second call to [`run`](Self::run) waits for the
/// first to finish, so two triggers never check-then-create the same
/// enquiry concurrently.
pub struct IngestionPipeline<M, S, A> {
    mailbox: M,
    store: S,
    activities: A,
    registry: ParserRegistry,
    run_lock: Mutex<()>,
}

impl<M, S, A> IngestionPipeline<M, S, A>
where
    M: Mailbox,
    S: LeadStore,
    A: ActivityLog,
{
    /// Create a pipeline over its collaborators.
    pub fn new(mailbox: M, store: S, activities: A, registry: ParserRegistry) -> Self {
        Self {
            mailbox,
            store,
            activities,
            registry,
            run_lock: Mutex::new(()),
        }
    }

    /// The mailbox being drained.
    pub const fn mailbox(&self) -> &M {
        &self.mailbox
    }

    /// Process every unprocessed message once.
    ///
    /// Per-message problems are recorded in the report and never abort the
    /// run. Every listed message is marked processed, including ones that
    /// failed to parse.
    ///
    /// # Errors
    ///
    /// Returns an error only if the mailbox cannot be listed.
    pub async fn run(&self) -> Result<IngestionReport> {
        let _guard = self.run_lock.lock().await;

        let messages = self.mailbox.list_unprocessed().await?;
        let mut report = IngestionReport::default();

        for message in messages {
            match self.process(&message).await {
                Outcome::Created(lead) => {
                    info!(
                        message = %message.id,
                        lead = %lead.id,
                        source = lead.source.as_str(),
                        "Lead created"
                    );
                    report.created += 1;
                    report.leads.push(lead);
                }
                Outcome::Duplicate(existing) => {
                    info!(message = %message.id, lead = %existing, "Duplicate lead skipped");
                    report.skipped += 1;
                }
                Outcome::Unparsed(reason) => {
                    warn!(message = %message.id, reason = %reason, "Message not parsed");
                    report.skipped += 1;
                    report.errors.push(format!("{}: {reason}", message.id));
                }
                Outcome::Failed(reason) => {
                    warn!(message = %message.id, reason = %reason, "Lead not stored");
                    report.failed += 1;
                    report.errors.push(format!("{}: {reason}", message.id));
                }
            }

            if let Err(e) = self.mailbox.mark_processed(&message.id).await {
                warn!(message = %message.id, error = %e, "Failed to mark message processed");
                report
                    .errors
                    .push(format!("{}: failed to mark processed: {e}", message.id));
            }
            report.processed += 1;
        }

        info!(
            processed = report.processed,
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "Ingestion run complete"
        );
        Ok(report)
    }

    async fn process(&self, message: &InboundMessage) -> Outcome {
        let lead = match self.registry.parse_message(message) {
            Ok(lead) => lead,
            Err(failure) => return Outcome::Unparsed(failure.to_string()),
        };

        match self.find_existing(&lead).await {
            Ok(Some(existing)) => return Outcome::Duplicate(existing),
            Ok(None) => {}
            Err(e) => return Outcome::Failed(format!("duplicate check failed: {e}")),
        }

        let source = lead.source;
        let stored = match self.store.create(&NewLead::from(lead)).await {
            Ok(stored) => stored,
            Err(e) => return Outcome::Failed(format!("failed to create lead: {e}")),
        };

        let description = format!("Lead created from {} email", source.display_name());
        if let Err(e) = self
            .activities
            .append(stored.id, ActivityKind::LeadCreated, &description)
            .await
        {
            let mut reason = format!("failed to record activity: {e}");
            if let Err(rollback) = self.store.delete(stored.id).await {
                reason.push_str(&format!("; rollback of lead {} failed: {rollback}", stored.id));
            }
            return Outcome::Failed(reason);
        }

        Outcome::Created(CreatedLead {
            id: stored.id,
            email: stored.details.email,
            source,
        })
    }

    async fn find_existing(&self, lead: &ParsedLead) -> Result<Option<LeadId>> {
        let existing = if let Some(email) = &lead.fields.email {
            self.store.find_by_email(email).await?
        } else if let Some(phone) = &lead.fields.phone {
            self.store.find_by_phone(phone).await?
        } else {
            None
        };
        Ok(existing.map(|lead| lead.id))
    }
}
