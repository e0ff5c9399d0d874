//! Database schema definitions
//!
//! Contains SQL for creating all tables and indexes

use rusqlite::Connection;
use super::DbError;

/// SQL schema for all tables
const SCHEMA: &str = r#"
-- Replication pricing rates (scan order = rowid order)
CREATE TABLE IF NOT EXISTS pricing (
    service_type TEXT NOT NULL,
    cloud TEXT NOT NULL,
    region TEXT NOT NULL,
    unit TEXT NOT NULL,
    rate REAL NOT NULL CHECK (rate >= 0),
    currency TEXT NOT NULL DEFAULT 'CREDITS',
    updated_at TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_pricing_service ON pricing(service_type);

-- Database size metadata
CREATE TABLE IF NOT EXISTS db_metadata (
    database_name TEXT PRIMARY KEY,
    size_tb REAL NOT NULL CHECK (size_tb >= 0),
    as_of TEXT
);
"#;

/// Default estimated rates, credits per unit
const DEFAULT_PRICING: &str = r#"
INSERT INTO pricing (service_type, cloud, region, unit, rate, currency) VALUES
    ('DATA_TRANSFER', 'AWS', 'us-east-1', 'TB', 0.02, 'CREDITS'),
    ('REPLICATION_COMPUTE', 'AWS', 'us-east-1', 'TB', 0.05, 'CREDITS'),
    ('STORAGE_TB_MONTH', 'AWS', 'us-east-1', 'TB-month', 23.0, 'CREDITS'),
    ('SERVERLESS_MAINT', 'AWS', 'us-east-1', 'TB-month', 1.5, 'CREDITS'),
    ('DATA_TRANSFER', 'AWS', 'us-west-2', 'TB', 0.02, 'CREDITS'),
    ('REPLICATION_COMPUTE', 'AWS', 'us-west-2', 'TB', 0.05, 'CREDITS'),
    ('STORAGE_TB_MONTH', 'AWS', 'us-west-2', 'TB-month', 23.0, 'CREDITS'),
    ('SERVERLESS_MAINT', 'AWS', 'us-west-2', 'TB-month', 1.5, 'CREDITS'),
    ('DATA_TRANSFER', 'AZURE', 'eastus2', 'TB', 0.0875, 'CREDITS'),
    ('REPLICATION_COMPUTE', 'AZURE', 'eastus2', 'TB', 0.05, 'CREDITS'),
    ('STORAGE_TB_MONTH', 'AZURE', 'eastus2', 'TB-month', 23.0, 'CREDITS'),
    ('SERVERLESS_MAINT', 'AZURE', 'eastus2', 'TB-month', 1.5, 'CREDITS'),
    ('DATA_TRANSFER', 'GCP', 'us-central1', 'TB', 0.12, 'CREDITS'),
    ('REPLICATION_COMPUTE', 'GCP', 'us-central1', 'TB', 0.05, 'CREDITS'),
    ('STORAGE_TB_MONTH', 'GCP', 'us-central1', 'TB-month', 20.0, 'CREDITS'),
    ('SERVERLESS_MAINT', 'GCP', 'us-central1', 'TB-month', 1.5, 'CREDITS');
"#;

/// Create all database tables
pub fn create_tables(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insert default pricing data
pub fn insert_default_pricing(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(DEFAULT_PRICING)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        insert_default_pricing(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('pricing', 'db_metadata')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_default_pricing_covers_every_service_type() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        insert_default_pricing(&conn).unwrap();

        let distinct: i32 = conn
            .query_row("SELECT COUNT(DISTINCT service_type) FROM pricing", [], |row| row.get(0))
            .unwrap();
        assert_eq!(distinct, 4);
    }

    #[test]
    fn test_negative_rate_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO pricing (service_type, cloud, region, unit, rate) VALUES ('DATA_TRANSFER', 'AWS', 'x', 'TB', -1)",
            [],
        );
        assert!(result.is_err());
    }
}
