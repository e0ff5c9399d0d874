//! Database query implementations
//!
//! Reads return rows in insertion order so rate lookup stays deterministic.
//! Replacements are clear-then-insert and must run inside a transaction.

use rusqlite::{params, Connection};

use super::DbError;
use crate::models::{DatabaseInfo, PricingRate, ServiceType};

/// Number of pricing rows
pub fn count_pricing(conn: &Connection) -> Result<i64, DbError> {
    let count = conn.query_row("SELECT COUNT(*) FROM pricing", [], |row| row.get(0))?;
    Ok(count)
}

/// Load every pricing row in scan order
///
/// Rows whose service type is not one of the known kinds are skipped with a
/// warning; they can never match a lookup.
pub fn load_pricing(conn: &Connection) -> Result<Vec<PricingRate>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT service_type, cloud, region, unit, rate, currency, updated_at
        FROM pricing
        ORDER BY rowid
        "#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            let raw: String = row.get(0)?;
            let Ok(service_type) = raw.parse::<ServiceType>() else {
                tracing::warn!("Skipping pricing row with unknown service type {:?}", raw);
                return Ok(None);
            };

            Ok(Some(PricingRate {
                service_type,
                cloud: row.get(1)?,
                region: row.get(2)?,
                unit: row.get(3)?,
                rate: row.get(4)?,
                currency: row.get(5)?,
                updated_at: row.get(6)?,
            }))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().flatten().collect())
}

/// Clear the pricing table and insert `rates` stamped with `updated_at`
pub fn replace_pricing(
    conn: &Connection,
    rates: &[PricingRate],
    updated_at: &str,
) -> Result<usize, DbError> {
    let removed = conn.execute("DELETE FROM pricing", [])?;

    let mut stmt = conn.prepare(
        r#"
        INSERT INTO pricing (service_type, cloud, region, unit, rate, currency, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;

    for rate in rates {
        stmt.execute(params![
            rate.service_type.as_str(),
            rate.cloud,
            rate.region,
            rate.unit,
            rate.rate,
            rate.currency,
            updated_at,
        ])?;
    }

    tracing::debug!("Replaced {} pricing rows with {}", removed, rates.len());
    Ok(rates.len())
}

/// Load database size metadata ordered by name
pub fn load_databases(conn: &Connection) -> Result<Vec<DatabaseInfo>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT database_name, size_tb, as_of
        FROM db_metadata
        ORDER BY database_name
        "#,
    )?;

    let databases = stmt
        .query_map([], |row| {
            Ok(DatabaseInfo {
                name: row.get(0)?,
                size_tb: row.get(1)?,
                as_of: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(databases)
}

/// Clear the metadata table and insert `databases`
pub fn replace_databases(conn: &Connection, databases: &[DatabaseInfo]) -> Result<usize, DbError> {
    conn.execute("DELETE FROM db_metadata", [])?;

    let mut stmt = conn.prepare(
        "INSERT INTO db_metadata (database_name, size_tb, as_of) VALUES (?1, ?2, ?3)",
    )?;
    for db in databases {
        stmt.execute(params![db.name, db.size_tb, db.as_of])?;
    }

    Ok(databases.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_load_pricing_preserves_insert_order() {
        let conn = setup();
        let rates = vec![
            PricingRate::new(ServiceType::StorageTbMonth, "GCP", "us-central1", "TB-month", 20.0),
            PricingRate::new(ServiceType::DataTransfer, "AWS", "us-east-1", "TB", 0.02),
            PricingRate::new(ServiceType::StorageTbMonth, "AWS", "us-east-1", "TB-month", 23.0),
        ];
        replace_pricing(&conn, &rates, "2026-03-01T00:00:00Z").unwrap();

        let loaded = load_pricing(&conn).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].cloud, "GCP");
        assert_eq!(loaded[1].service_type, ServiceType::DataTransfer);
        assert_eq!(loaded[2].rate, 23.0);
        assert!(loaded
            .iter()
            .all(|r| r.updated_at.as_deref() == Some("2026-03-01T00:00:00Z")));
    }

    #[test]
    fn test_replace_pricing_is_wholesale() {
        let conn = setup();
        schema::insert_default_pricing(&conn).unwrap();

        let rates = vec![PricingRate::new(ServiceType::DataTransfer, "AWS", "us-east-1", "TB", 0.03)];
        replace_pricing(&conn, &rates, "2026-03-01T00:00:00Z").unwrap();

        assert_eq!(count_pricing(&conn).unwrap(), 1);
    }

    #[test]
    fn test_unknown_service_type_row_skipped() {
        let conn = setup();
        schema::insert_default_pricing(&conn).unwrap();
        let seeded = count_pricing(&conn).unwrap() as usize;
        conn.execute(
            "INSERT INTO pricing (service_type, cloud, region, unit, rate) VALUES ('CLOUD_SERVICES', 'AWS', 'us-east-1', 'TB', 1)",
            [],
        )
        .unwrap();

        let loaded = load_pricing(&conn).unwrap();

        assert_eq!(loaded.len(), seeded);
        assert_eq!(count_pricing(&conn).unwrap() as usize, seeded + 1);
    }

    #[test]
    fn test_databases_round_trip() {
        let conn = setup();
        let dbs = vec![
            DatabaseInfo {
                name: "SALES".to_string(),
                size_tb: 4.5,
                as_of: Some("2026-03-01".to_string()),
            },
            DatabaseInfo::new("ANALYTICS", 10.0),
        ];
        replace_databases(&conn, &dbs).unwrap();

        let loaded = load_databases(&conn).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "ANALYTICS");
        assert_eq!(loaded[1].as_of.as_deref(), Some("2026-03-01"));
    }

    #[test]
    fn test_duplicate_database_name_rejected() {
        let conn = setup();
        let dbs = vec![DatabaseInfo::new("SALES", 1.0), DatabaseInfo::new("SALES", 2.0)];
        assert!(replace_databases(&conn, &dbs).is_err());
    }
}
