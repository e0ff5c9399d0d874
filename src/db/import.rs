//! CSV import for the database metadata source

use std::io::Read;

use serde::Deserialize;

use super::DbError;
use crate::models::DatabaseInfo;

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    #[serde(alias = "DATABASE_NAME", alias = "name")]
    database_name: String,
    #[serde(alias = "SIZE_TB")]
    size_tb: f64,
    #[serde(default, alias = "AS_OF")]
    as_of: Option<String>,
}

/// Read `DATABASE_NAME,SIZE_TB[,AS_OF]` rows
pub fn read_metadata_csv<R: Read>(reader: R) -> Result<Vec<DatabaseInfo>, DbError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut databases = Vec::new();
    for (i, record) in csv_reader.deserialize::<MetadataRecord>().enumerate() {
        let record = record.map_err(|e| DbError::Import(format!("row {}: {}", i + 1, e)))?;
        if !(record.size_tb.is_finite() && record.size_tb >= 0.0) {
            return Err(DbError::Import(format!(
                "row {}: size must be a non-negative number (got {})",
                i + 1,
                record.size_tb
            )));
        }
        databases.push(DatabaseInfo {
            name: record.database_name,
            size_tb: record.size_tb,
            as_of: record.as_of.filter(|s| !s.is_empty()),
        });
    }

    Ok(databases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_metadata_csv() {
        let csv = "DATABASE_NAME,SIZE_TB,AS_OF\nSALES,4.5,2026-03-01\nANALYTICS,10,\n";
        let dbs = read_metadata_csv(csv.as_bytes()).unwrap();

        assert_eq!(dbs.len(), 2);
        assert_eq!(dbs[0].name, "SALES");
        assert_eq!(dbs[0].as_of.as_deref(), Some("2026-03-01"));
        assert_eq!(dbs[1].size_tb, 10.0);
        assert!(dbs[1].as_of.is_none());
    }

    #[test]
    fn test_read_metadata_csv_without_as_of() {
        let csv = "database_name,size_tb\nSALES,1.25\n";
        let dbs = read_metadata_csv(csv.as_bytes()).unwrap();
        assert_eq!(dbs[0].size_tb, 1.25);
    }

    #[test]
    fn test_read_metadata_csv_negative_size() {
        let csv = "DATABASE_NAME,SIZE_TB\nSALES,-1\n";
        assert!(matches!(read_metadata_csv(csv.as_bytes()), Err(DbError::Import(_))));
    }
}
