//! `SQLite` storage for leads and their activity log.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use super::model::{Activity, ActivityKind, Lead, LeadId, LeadStatus, NewLead, PropertyType};
use super::store::{ActivityLog, LeadStore};
use crate::ingest::fields::{normalize_email, normalize_phone};
use crate::ingest::{ParsedLeadFields, ServiceFlags, SourceId};
use crate::{Error, Result};

const LEAD_COLUMNS: &str = "id, status, source, email, phone, first_name, last_name, company, \
     from_address, from_postcode, to_address, to_postcode, move_date, bedrooms, \
     property_type, packing, cleaning, notes, created_at, updated_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for leads and activities.
pub struct LeadRepository {
    pool: SqlitePool,
}

impl LeadRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                status TEXT NOT NULL DEFAULT 'pending_review',
                source TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                first_name TEXT,
                last_name TEXT,
                company TEXT,
                from_address TEXT,
                from_postcode TEXT,
                to_address TEXT,
                to_postcode TEXT,
                move_date TEXT,
                bedrooms INTEGER,
                property_type TEXT,
                packing INTEGER NOT NULL DEFAULT 0,
                cleaning INTEGER NOT NULL DEFAULT 0,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // One lead per email address
        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_leads_email
            ON leads(email) WHERE email IS NOT NULL
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_phone ON leads(phone)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lead_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_activities_lead ON activities(lead_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a lead by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: LeadId) -> Result<Option<Lead>> {
        let row = sqlx::query(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().and_then(row_to_lead))
    }

    /// List leads, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, status: Option<LeadStatus>) -> Result<Vec<Lead>> {
        let status = status.map(|s| s.as_str());
        let rows = sqlx::query(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE ? IS NULL OR status = ? ORDER BY id DESC"
        ))
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_lead).collect())
    }

    /// Move a lead to a new workflow status and record the change.
    ///
    /// The status update and its `status_change` activity entry are written
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LeadNotFound`] if no lead has this ID, or an error if
    /// the database operation fails.
    pub async fn update_status(
        &self,
        id: LeadId,
        status: LeadStatus,
        note: Option<&str>,
    ) -> Result<Lead> {
        let previous = self.get(id).await?.ok_or(Error::LeadNotFound(id))?;
        let now = Utc::now().to_rfc3339();

        let mut description = format!(
            "Status changed from {} to {}",
            previous.status.as_str(),
            status.as_str()
        );
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            description.push_str(": ");
            description.push_str(note);
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE leads SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO activities (lead_id, kind, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.0)
        .bind(ActivityKind::StatusChange.as_str())
        .bind(&description)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(lead = %id, status = status.as_str(), "Lead status updated");
        self.get(id).await?.ok_or(Error::LeadNotFound(id))
    }

    /// Append an activity entry and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LeadNotFound`] if no lead has this ID, or an error if
    /// the database operation fails.
    pub async fn append_activity(
        &self,
        lead_id: LeadId,
        kind: ActivityKind,
        description: &str,
    ) -> Result<Activity> {
        let exists = sqlx::query("SELECT 1 FROM leads WHERE id = ?")
            .bind(lead_id.0)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if !exists {
            return Err(Error::LeadNotFound(lead_id));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO activities (lead_id, kind, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(lead_id.0)
        .bind(kind.as_str())
        .bind(description)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Activity {
            id: result.last_insert_rowid(),
            lead_id,
            kind,
            description: description.to_string(),
            created_at,
        })
    }

    /// Activity entries for a lead, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn activities(&self, lead_id: LeadId) -> Result<Vec<Activity>> {
        let rows = sqlx::query(
            r"
            SELECT id, lead_id, kind, description, created_at
            FROM activities
            WHERE lead_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(lead_id.0)
        .fetch_all(&self.pool)
        .await?;

        let activities = rows
            .iter()
            .filter_map(|row| {
                let created_at = parse_timestamp(row.get("created_at"))?;
                Some(Activity {
                    id: row.get("id"),
                    lead_id: LeadId(row.get::<i64, _>("lead_id")),
                    kind: ActivityKind::parse(row.get("kind")),
                    description: row.get("description"),
                    created_at,
                })
            })
            .collect();

        Ok(activities)
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Lead>> {
        let row = sqlx::query(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE {column} = ? ORDER BY id ASC LIMIT 1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_lead))
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let normalized = normalize_email(email).unwrap_or_else(|| email.trim().to_lowercase());
        self.find_one("email", &normalized).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        let normalized = normalize_phone(phone)
            .unwrap_or_else(|| phone.chars().filter(char::is_ascii_digit).collect());
        self.find_one("phone", &normalized).await
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead> {
        let now = Utc::now();
        let details = &lead.details;

        let result = sqlx::query(
            r"
            INSERT INTO leads (
                status, source, email, phone, first_name, last_name, company,
                from_address, from_postcode, to_address, to_postcode, move_date,
                bedrooms, property_type, packing, cleaning, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(lead.status.as_str())
        .bind(lead.source.as_str())
        .bind(&details.email)
        .bind(&details.phone)
        .bind(&details.first_name)
        .bind(&details.last_name)
        .bind(&details.company)
        .bind(&details.from_address)
        .bind(&details.from_postcode)
        .bind(&details.to_address)
        .bind(&details.to_postcode)
        .bind(details.move_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(details.bedrooms.map(i64::from))
        .bind(details.property_type.map(|p| p.as_str()))
        .bind(details.services.packing)
        .bind(details.services.cleaning)
        .bind(&details.notes)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = LeadId(result.last_insert_rowid());
        debug!(lead = %id, source = lead.source.as_str(), "Lead stored");

        Ok(Lead {
            id,
            status: lead.status,
            source: lead.source,
            details: details.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn delete(&self, id: LeadId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM activities WHERE lead_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityLog for LeadRepository {
    async fn append(&self, lead_id: LeadId, kind: ActivityKind, description: &str) -> Result<()> {
        self.append_activity(lead_id, kind, description)
            .await
            .map(|_| ())
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a database row to a `Lead`.
fn row_to_lead(row: &SqliteRow) -> Option<Lead> {
    let created_at = parse_timestamp(row.get("created_at"))?;
    let updated_at = parse_timestamp(row.get("updated_at"))?;

    let details = ParsedLeadFields {
        email: row.get("email"),
        phone: row.get("phone"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        company: row.get("company"),
        from_address: row.get("from_address"),
        from_postcode: row.get("from_postcode"),
        to_address: row.get("to_address"),
        to_postcode: row.get("to_postcode"),
        move_date: row
            .get::<Option<String>, _>("move_date")
            .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        bedrooms: row
            .get::<Option<i64>, _>("bedrooms")
            .and_then(|b| u8::try_from(b).ok()),
        property_type: row
            .get::<Option<String>, _>("property_type")
            .as_deref()
            .and_then(PropertyType::parse),
        notes: row.get("notes"),
        services: ServiceFlags {
            packing: row.get("packing"),
            cleaning: row.get("cleaning"),
        },
    };

    Some(Lead {
        id: LeadId(row.get("id")),
        status: LeadStatus::parse(row.get("status")),
        source: SourceId::parse(row.get("source")),
        details,
        created_at,
        updated_at,
    })
}
