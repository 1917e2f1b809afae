//! End-to-end ingestion runs.
//!
//! These tests drive the pipeline against an in-memory `SQLite` repository,
//! in-process and maildir mailboxes, and collaborator doubles that fail on
//! demand.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use leadledger_core::{
    ActivityKind, ActivityLog, Error, InboundMessage, IngestionPipeline, Lead, LeadId,
    LeadRepository, LeadStatus, LeadStore, Mailbox, MaildirMailbox, MemoryMailbox, MessageId,
    NewLead, ParserRegistry, Result, SourceId,
};

const CMM_SUBJECT: &str = "Removals lead from comparemymove.com (John Smith)";
const CMM_BODY: &str = "\
Email: john.smith@email.com
Phone: 07700 900123
Moving from: 45 High Street, London, NW1 2AB
Moving to: 12 Oak Avenue, Manchester, M1 5GH
Move date: 15/03/2026
Bedrooms: 3
";

fn cmm_message(id: &str) -> InboundMessage {
    InboundMessage::new(id, "accounts@comparemymove.com", CMM_SUBJECT).with_text(CMM_BODY)
}

fn stranger_message(id: &str) -> InboundMessage {
    InboundMessage::new(id, "friend@example.com", "Lunch?")
        .with_text("Are you free on Thursday? No rush to reply.")
}

type Pipeline<M> = IngestionPipeline<M, Arc<LeadRepository>, Arc<LeadRepository>>;

async fn pipeline<M: Mailbox>(mailbox: M) -> (Pipeline<M>, Arc<LeadRepository>) {
    let repo = Arc::new(LeadRepository::in_memory().await.unwrap());
    let pipeline = IngestionPipeline::new(
        mailbox,
        Arc::clone(&repo),
        Arc::clone(&repo),
        ParserRegistry::default(),
    );
    (pipeline, repo)
}

#[tokio::test]
async fn test_compare_my_move_fixture_creates_lead() {
    let (pipeline, repo) = pipeline(MemoryMailbox::with_messages([cmm_message("m1")])).await;

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.leads[0].email.as_deref(), Some("john.smith@email.com"));
    assert_eq!(report.leads[0].source, SourceId::CompareMyMove);

    let lead = repo.get(report.leads[0].id).await.unwrap().unwrap();
    assert_eq!(lead.status, LeadStatus::PendingReview);
    assert_eq!(lead.details.phone.as_deref(), Some("07700900123"));
    assert_eq!(lead.details.from_postcode.as_deref(), Some("NW1 2AB"));
    assert_eq!(lead.details.to_postcode.as_deref(), Some("M1 5GH"));
    assert_eq!(lead.details.move_date, NaiveDate::from_ymd_opt(2026, 3, 15));
    assert_eq!(lead.details.bedrooms, Some(3));
    assert_eq!(lead.display_name(), "John Smith");

    let activities = repo.activities(lead.id).await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].kind, ActivityKind::LeadCreated);
    assert!(activities[0].description.contains("CompareMyMove"));

    assert_eq!(pipeline.mailbox().processed_ids(), vec![MessageId::new("m1")]);
}

#[tokio::test]
async fn test_same_email_twice_in_one_run() {
    let (pipeline, repo) =
        pipeline(MemoryMailbox::with_messages([cmm_message("a"), cmm_message("b")])).await;

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
    assert_eq!(pipeline.mailbox().processed_ids().len(), 2);
}

#[tokio::test]
async fn test_duplicate_of_earlier_run() {
    let (pipeline, repo) = pipeline(MemoryMailbox::with_messages([cmm_message("a")])).await;
    pipeline.run().await.unwrap();

    pipeline.mailbox().push(
        InboundMessage::new("b", "leads@reallymoving.com", "Lead")
            .with_html("<table><tr><td>Email Address</td><td>JOHN.SMITH@email.com</td></tr></table>"),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_phone_only_duplicate() {
    let phone_lead = |id: &str, phone: &str| {
        InboundMessage::new(id, "jobs@getamover.co.uk", "New job")
            .with_html(format!("<p>First name: Sam</p><p>Mobile: {phone}</p>"))
    };
    let (pipeline, repo) = pipeline(MemoryMailbox::with_messages([
        phone_lead("1", "07911 123456"),
        phone_lead("2", "+44 7911 123456"),
    ]))
    .await;

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.leads[0].email, None);
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unparsed_message_recorded_and_marked() {
    let (pipeline, repo) = pipeline(MemoryMailbox::with_messages([
        stranger_message("s1"),
        cmm_message("m1"),
    ]))
    .await;

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, vec!["s1: no contact identifier found".to_string()]);
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
    assert_eq!(pipeline.mailbox().processed_ids().len(), 2);
}

#[tokio::test]
async fn test_report_serializes() {
    let (pipeline, _repo) = pipeline(MemoryMailbox::with_messages([cmm_message("m1")])).await;
    let report = pipeline.run().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["created"], 1);
    assert_eq!(json["leads"][0]["source"], "comparemymove");
    assert_eq!(json["leads"][0]["email"], "john.smith@email.com");
}

/// Activity log that always fails.
struct BrokenActivityLog;

#[async_trait]
impl ActivityLog for BrokenActivityLog {
    async fn append(&self, _lead_id: LeadId, _kind: ActivityKind, _description: &str) -> Result<()> {
        Err(Error::Config("activity log offline".to_string()))
    }
}

#[tokio::test]
async fn test_activity_failure_rolls_back_lead() {
    let repo = Arc::new(LeadRepository::in_memory().await.unwrap());
    let pipeline = IngestionPipeline::new(
        MemoryMailbox::with_messages([cmm_message("m1")]),
        Arc::clone(&repo),
        BrokenActivityLog,
        ParserRegistry::default(),
    );

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 1);
    assert!(report.leads.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("m1: failed to record activity"));
    assert!(repo.list(None).await.unwrap().is_empty());
    assert_eq!(pipeline.mailbox().processed_ids().len(), 1);
}

/// Store that refuses to create leads for one email address.
struct PickyStore {
    inner: Arc<LeadRepository>,
    refuse: &'static str,
}

#[async_trait]
impl LeadStore for PickyStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        self.inner.find_by_phone(phone).await
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead> {
        if lead.details.email.as_deref() == Some(self.refuse) {
            return Err(Error::Config("disk full".to_string()));
        }
        self.inner.create(lead).await
    }

    async fn delete(&self, id: LeadId) -> Result<()> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_store_failure_does_not_abort_run() {
    let repo = Arc::new(LeadRepository::in_memory().await.unwrap());
    let store = PickyStore {
        inner: Arc::clone(&repo),
        refuse: "john.smith@email.com",
    };
    let other = InboundMessage::new("m2", "forms@acme.example", "Instant quote")
        .with_text("Full Name: Kim Ng\nEmail: kim@ng.example");
    let pipeline = IngestionPipeline::new(
        MemoryMailbox::with_messages([cmm_message("m1"), other]),
        store,
        Arc::clone(&repo),
        ParserRegistry::default(),
    );

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.leads[0].source, SourceId::Website);
    assert!(report.errors[0].starts_with("m1: failed to create lead"));
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
}

/// Mailbox that cannot be listed.
struct OfflineMailbox;

#[async_trait]
impl Mailbox for OfflineMailbox {
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>> {
        Err(Error::MailboxUnavailable("connection refused".to_string()))
    }

    async fn mark_processed(&self, _id: &MessageId) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unreachable_mailbox_fails_run() {
    let (pipeline, _repo) = pipeline(OfflineMailbox).await;
    let result = pipeline.run().await;
    assert!(matches!(result, Err(Error::MailboxUnavailable(_))));
}

/// Mailbox whose messages can never be marked processed.
struct StickyMailbox(MemoryMailbox);

#[async_trait]
impl Mailbox for StickyMailbox {
    async fn list_unprocessed(&self) -> Result<Vec<InboundMessage>> {
        self.0.list_unprocessed().await
    }

    async fn mark_processed(&self, id: &MessageId) -> Result<()> {
        Err(Error::InvalidMessageId(id.to_string()))
    }
}

#[tokio::test]
async fn test_mark_failure_recorded() {
    let (pipeline, _repo) =
        pipeline(StickyMailbox(MemoryMailbox::with_messages([cmm_message("m1")]))).await;

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("m1: failed to mark processed"));

    // Listed again next time, but now a duplicate
    let again = pipeline.run().await.unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.skipped, 1);
}

#[tokio::test]
async fn test_overlapping_runs_serialize() {
    let (pipeline, repo) =
        pipeline(MemoryMailbox::with_messages([cmm_message("a"), cmm_message("b")])).await;
    let pipeline = Arc::new(pipeline);

    let (first, second) = tokio::join!(pipeline.run(), pipeline.run());
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.processed + second.processed, 2);
    assert_eq!(first.created + second.created, 1);
    assert_eq!(repo.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_maildir_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = MaildirMailbox::new(dir.path());
    mailbox.ensure_layout().await.unwrap();

    let raw = format!(
        "From: CompareMyMove <accounts@comparemymove.com>\r\n\
         Subject: {CMM_SUBJECT}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         Content-Transfer-Encoding: quoted-printable\r\n\
         \r\n\
         {}",
        CMM_BODY.replace('\n', "\r\n")
    );
    tokio::fs::write(dir.path().join("new/1767225600.M1.host"), raw)
        .await
        .unwrap();
    tokio::fs::write(dir.path().join("new/1767225601.M2.host"), "not an email at all")
        .await
        .unwrap();

    let (pipeline, repo) = pipeline(mailbox).await;
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("1767225601.M2.host: "));

    let leads = repo.list(None).await.unwrap();
    assert_eq!(leads[0].details.email.as_deref(), Some("john.smith@email.com"));

    assert!(dir.path().join("cur/1767225600.M1.host:2,S").exists());
    assert!(dir.path().join("cur/1767225601.M2.host:2,S").exists());
    assert!(pipeline.mailbox().list_unprocessed().await.unwrap().is_empty());
}
