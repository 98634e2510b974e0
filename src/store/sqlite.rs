// SQLite record store.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Methods lock the mutex, do synchronous rusqlite work, and return.
// Locations and image URLs are stored as JSON arrays.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode};
use tokio::sync::Mutex;
use tracing::debug;

use super::models::{NewListing, StoredListing};
use super::traits::{RecordStore, StoreError};

pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `db_path` and create tables.
    pub fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        create_tables(&conn)?;

        Ok(Self::new(conn))
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self::new(conn))
    }

    fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Number of stored listings.
    pub async fn count_listings(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        let count = conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch a listing by id.
    pub async fn get_listing(&self, id: &str) -> Result<Option<StoredListing>> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(None);
        };
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, listing_json, created_at FROM listings WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![rowid])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let id: i64 = row.get(0)?;
        let json: String = row.get(1)?;
        let created_at: String = row.get(2)?;
        let listing: NewListing =
            serde_json::from_str(&json).context("Corrupt listing_json column")?;

        Ok(Some(StoredListing {
            id: id.to_string(),
            listing,
            created_at,
        }))
    }
}

/// Create all tables if they don't exist yet. Idempotent.
fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS listings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,                -- 'sale' or 'donation'
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            status TEXT NOT NULL,              -- 'active' on creation
            listing_json TEXT NOT NULL,        -- full NewListing as JSON
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_listings_owner ON listings(owner_id);
        CREATE INDEX IF NOT EXISTS idx_listings_category ON listings(category);
        ",
    )
    .context("Failed to create tables")?;
    Ok(())
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create_listing(&self, listing: &NewListing) -> Result<String, StoreError> {
        let json = serde_json::to_string(listing).context("Failed to encode listing")?;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO listings (kind, title, category, owner_id, status, listing_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                listing.kind.as_str(),
                listing.title,
                listing.category,
                listing.owner_id,
                listing.status,
                json
            ],
        )
        .map_err(sqlite_error)?;

        let id = conn.last_insert_rowid().to_string();
        debug!(id = id, owner = listing.owner_id, "Listing record written");
        Ok(id)
    }
}

fn sqlite_error(e: rusqlite::Error) -> StoreError {
    let message = e.to_string();
    match e.sqlite_error_code() {
        Some(ErrorCode::ReadOnly)
        | Some(ErrorCode::PermissionDenied)
        | Some(ErrorCode::AuthorizationForStatementDenied) => StoreError::PermissionDenied(message),
        Some(ErrorCode::DiskFull) | Some(ErrorCode::TooBig) => StoreError::QuotaExceeded(message),
        Some(ErrorCode::DatabaseBusy)
        | Some(ErrorCode::DatabaseLocked)
        | Some(ErrorCode::CannotOpen)
        | Some(ErrorCode::SystemIoFailure) => StoreError::Unavailable(message),
        _ => StoreError::Other(anyhow::Error::new(e).context("Failed to write listing")),
    }
}
