//! SQLite-backed persistence store
//!
//! One `Store` owns the database connection for the life of the process.
//! Repositories (`components()`, `suppliers()`, `projects()`, `bom()`,
//! `dashboard()`) borrow the store and scope the SQL for one entity family.
//! The schema is created idempotently on open.

mod alerts;
mod bom;
mod components;
mod projects;
mod schema;
mod suppliers;
mod types;

pub use alerts::Dashboard;
pub use bom::BomRepo;
pub use components::{ComponentEdits, ComponentFilter, ComponentRepo, NewComponent, PriceUpdate};
pub use projects::ProjectRepo;
pub use suppliers::{NewOffer, SupplierRepo};
pub use types::*;

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use thiserror::Error;

/// Errors surfaced by the store layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or violated a uniqueness rule
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation referenced a row that does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Underlying database failure
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// The inventory store backed by SQLite
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store at the given path.
    ///
    /// Failure here is fatal to the process: the store is required
    /// infrastructure for every command.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Inventory repository over components and price history
    pub fn components(&self) -> ComponentRepo<'_> {
        ComponentRepo::new(self)
    }

    /// Supplier repository over suppliers and component offers
    pub fn suppliers(&self) -> SupplierRepo<'_> {
        SupplierRepo::new(self)
    }

    /// Project repository
    pub fn projects(&self) -> ProjectRepo<'_> {
        ProjectRepo::new(self)
    }

    /// BOM repository over project line items
    pub fn bom(&self) -> BomRepo<'_> {
        BomRepo::new(self)
    }

    /// Read-only alert and counter aggregation
    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    /// Append an audit record. Best-effort: the log must never fail the
    /// operation that triggered it, so errors are swallowed.
    pub fn log_activity(&self, action: &str, details: &str) {
        let _ = self.conn.execute(
            "INSERT INTO activity_log (timestamp, action, details) VALUES (?1, ?2, ?3)",
            rusqlite::params![Utc::now().to_rfc3339(), action, details],
        );
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse an RFC 3339 datetime column, tolerating garbage with a sentinel
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
}

/// Parse an optional RFC 3339 datetime column
pub(crate) fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}
