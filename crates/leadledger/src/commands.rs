//! Command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{error, info};

use leadledger_core::{
    Activity, IngestConfig, IngestionPipeline, InboundMessage, Lead, LeadId, LeadRepository,
    LeadStatus, MaildirMailbox, MessageId, ParsedLeadFields, ParserRegistry, SourceDetector,
    SourceId,
};

use crate::cli::{Command, LeadsCommand};

type Pipeline = IngestionPipeline<MaildirMailbox, Arc<LeadRepository>, Arc<LeadRepository>>;

/// Dispatch a parsed command.
pub async fn run(command: Command, config: &IngestConfig) -> Result<()> {
    match command {
        Command::Ingest => ingest(config).await,
        Command::Watch { interval_secs } => {
            watch(config, interval_secs.unwrap_or(config.poll_interval_secs)).await
        }
        Command::Parse { file } => parse(config, &file).await,
        Command::Leads { command } => leads(config, command).await,
    }
}

fn registry(config: &IngestConfig) -> ParserRegistry {
    ParserRegistry::new(SourceDetector::new(config.website_domain.as_deref()))
}

async fn open_repository(config: &IngestConfig) -> Result<Arc<LeadRepository>> {
    let path = &config.database_path;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let path = path
        .to_str()
        .with_context(|| format!("database path is not UTF-8: {}", path.display()))?;

    let repo = LeadRepository::new(path)
        .await
        .with_context(|| format!("opening database {path}"))?;
    Ok(Arc::new(repo))
}

async fn pipeline(config: &IngestConfig) -> Result<Pipeline> {
    let mailbox = MaildirMailbox::new(config.maildir.clone());
    mailbox
        .ensure_layout()
        .await
        .with_context(|| format!("preparing maildir {}", config.maildir.display()))?;

    let repo = open_repository(config).await?;
    Ok(IngestionPipeline::new(
        mailbox,
        Arc::clone(&repo),
        repo,
        registry(config),
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn ingest(config: &IngestConfig) -> Result<()> {
    let pipeline = pipeline(config).await?;
    let report = pipeline.run().await.context("ingestion run failed")?;
    print_json(&report)
}

async fn watch(config: &IngestConfig, interval_secs: u64) -> Result<()> {
    if interval_secs == 0 {
        bail!("--interval-secs must be at least 1");
    }

    let pipeline = pipeline(config).await?;
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(
        maildir = %config.maildir.display(),
        interval_secs,
        "Watching for new enquiries"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match pipeline.run().await {
                    Ok(report) if report.processed > 0 => print_json(&report)?,
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Ingestion run failed"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("waiting for interrupt")?;
                info!("Interrupted, stopping");
                return Ok(());
            }
        }
    }
}

/// Dry-run output for a single message.
#[derive(Debug, Serialize)]
struct ParseOutput<'a> {
    from: &'a str,
    subject: &'a str,
    source: SourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ParsedLeadFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn parse(config: &IngestConfig, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let raw = String::from_utf8_lossy(&bytes);
    let id = MessageId::new(
        file.file_name()
            .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned()),
    );
    let message = InboundMessage::parse_raw(id, &raw)
        .with_context(|| format!("parsing {}", file.display()))?;

    let (source, fields, error) = match registry(config).parse_message(&message) {
        Ok(lead) => (lead.source, Some(lead.fields), None),
        Err(failure) => (failure.lead_source(), None, Some(failure.to_string())),
    };

    print_json(&ParseOutput {
        from: &message.from,
        subject: &message.subject,
        source,
        fields,
        error,
    })
}

/// A lead with its activity log.
#[derive(Debug, Serialize)]
struct LeadDetail {
    #[serde(flatten)]
    lead: Lead,
    activities: Vec<Activity>,
}

async fn leads(config: &IngestConfig, command: LeadsCommand) -> Result<()> {
    let repo = open_repository(config).await?;

    match command {
        LeadsCommand::List { status } => print_json(&repo.list(status).await?),
        LeadsCommand::Show { id } => {
            let id = LeadId::new(id);
            let lead = repo
                .get(id)
                .await?
                .with_context(|| format!("lead {id} not found"))?;
            let activities = repo.activities(id).await?;
            print_json(&LeadDetail { lead, activities })
        }
        LeadsCommand::Accept { id, note } => {
            set_status(&repo, LeadId::new(id), LeadStatus::Accepted, note.as_deref()).await
        }
        LeadsCommand::Reject { id, note } => {
            set_status(&repo, LeadId::new(id), LeadStatus::Rejected, note.as_deref()).await
        }
    }
}

async fn set_status(
    repo: &LeadRepository,
    id: LeadId,
    status: LeadStatus,
    note: Option<&str>,
) -> Result<()> {
    let lead = repo.update_status(id, status, note).await?;
    info!(lead = %lead.id, status = status.as_str(), "Lead updated");
    print_json(&lead)
}
