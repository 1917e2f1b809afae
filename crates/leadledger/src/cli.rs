//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadledger_core::{IngestConfig, LeadStatus};

/// Email lead ingestion for a removals CRM.
#[derive(Debug, Parser)]
#[command(name = "leadledger", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true, env = "LEADLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// `SQLite` database file.
    #[arg(long, global = true, env = "LEADLEDGER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Maildir spool to ingest from.
    #[arg(long, global = true, env = "LEADLEDGER_MAILDIR")]
    pub maildir: Option<PathBuf>,

    /// Sender domain of the company's own website forms.
    #[arg(long, global = true, env = "LEADLEDGER_WEBSITE_DOMAIN")]
    pub website_domain: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply(&self, config: &mut IngestConfig) {
        if let Some(database) = &self.database {
            config.database_path.clone_from(database);
        }
        if let Some(maildir) = &self.maildir {
            config.maildir.clone_from(maildir);
        }
        if let Some(domain) = &self.website_domain {
            config.website_domain = Some(domain.clone());
        }
    }
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest unprocessed messages once and print the report.
    Ingest,

    /// Ingest repeatedly until interrupted.
    Watch {
        /// Seconds between runs (overrides the configured interval).
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Parse a single message file without storing anything.
    Parse {
        /// Raw RFC 5322 message (`.eml`).
        file: PathBuf,
    },

    /// Review stored leads.
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },
}

/// Lead review commands.
#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    /// List leads, newest first.
    List {
        /// Only leads in this status (`pending_review`, `accepted`, `rejected`).
        #[arg(long, value_parser = parse_status)]
        status: Option<LeadStatus>,
    },

    /// Show a lead with its activity log.
    Show {
        /// Lead ID.
        id: i64,
    },

    /// Accept a lead.
    Accept {
        /// Lead ID.
        id: i64,
        /// Note recorded with the status change.
        #[arg(long)]
        note: Option<String>,
    },

    /// Reject a lead.
    Reject {
        /// Lead ID.
        id: i64,
        /// Note recorded with the status change.
        #[arg(long)]
        note: Option<String>,
    },
}

fn parse_status(value: &str) -> Result<LeadStatus, String> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "pending_review" | "pending" => Ok(LeadStatus::PendingReview),
        "accepted" => Ok(LeadStatus::Accepted),
        "rejected" => Ok(LeadStatus::Rejected),
        other => Err(format!("unknown status: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "leadledger",
            "--database",
            "/tmp/leads.db",
            "--website-domain",
            "acme.example",
            "ingest",
        ])
        .unwrap();

        let mut config = IngestConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.database_path, PathBuf::from("/tmp/leads.db"));
        assert_eq!(config.website_domain.as_deref(), Some("acme.example"));
    }

    #[test]
    fn test_leads_list_status() {
        let cli = Cli::try_parse_from(["leadledger", "leads", "list", "--status", "pending"]).unwrap();
        match cli.command {
            Command::Leads {
                command: LeadsCommand::List { status },
            } => assert_eq!(status, Some(LeadStatus::PendingReview)),
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["leadledger", "leads", "list", "--status", "lost"]).is_err());
    }
}
