//! Database module for SQLite operations
//!
//! This module stands in for the warehouse and handles:
//! - Schema creation and default rate seeding
//! - Pricing table reads and wholesale replacement
//! - Database size metadata reads and imports

pub mod import;
pub mod queries;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, Transaction};
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Create a new database connection, creating the parent directory if needed
    pub fn new(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Initialize the schema and seed default rates into an empty pricing table
    pub fn initialize(&self) -> Result<(), DbError> {
        self.with_connection(schema::create_tables)?;
        self.seed_default_pricing()?;
        Ok(())
    }

    /// Seed the default estimated rates if the pricing table is empty
    ///
    /// Returns whether anything was inserted.
    pub fn seed_default_pricing(&self) -> Result<bool, DbError> {
        self.with_transaction(|tx| {
            if queries::count_pricing(tx)? > 0 {
                return Ok(false);
            }
            tracing::info!("Pricing table empty, seeding default estimated rates");
            schema::insert_default_pricing(tx)?;
            Ok(true)
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a query with the database connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    /// Execute writes in a single transaction
    ///
    /// Commits only if `f` succeeds; any error rolls back every statement.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, DbError>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("replication-cost").join("pricing.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_seeds_once() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let seeded = db.with_connection(queries::count_pricing).unwrap();
        assert!(seeded > 0);

        db.initialize().unwrap();
        assert_eq!(db.with_connection(queries::count_pricing).unwrap(), seeded);
    }

    #[test]
    fn test_seed_default_pricing_only_when_empty() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert!(!db.seed_default_pricing().unwrap());

        db.with_connection(|conn| {
            conn.execute("DELETE FROM pricing", [])?;
            Ok(())
        })
        .unwrap();
        assert!(db.seed_default_pricing().unwrap());
        assert!(db.with_connection(queries::count_pricing).unwrap() > 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let before = db.with_connection(queries::count_pricing).unwrap();

        let result: Result<(), DbError> = db.with_transaction(|tx| {
            tx.execute("DELETE FROM pricing", [])?;
            Err(DbError::Import("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(db.with_connection(queries::count_pricing).unwrap(), before);
    }

    #[test]
    fn test_file_database_created() {
        let path = std::env::temp_dir()
            .join("replication_cost_db_test")
            .join("pricing.db");
        std::fs::remove_file(&path).ok();

        let db = Database::new(path.clone()).unwrap();
        db.initialize().unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), path.as_path());

        drop(db);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_default_db_path() {
        assert!(default_db_path().ends_with("replication-cost/pricing.db"));
    }
}
