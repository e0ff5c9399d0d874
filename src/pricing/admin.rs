//! Admin bulk edit of the pricing table
//!
//! An edited grid is validated as a whole before anything is written.
//! Rules run in a fixed order and the first failing rule is reported:
//! 1. required columns present
//! 2. rows with a blank required field are dropped
//! 3. service type, cloud and currency upper-cased
//! 4. every rate a finite number strictly greater than zero
//! 5. every currency is CREDITS
//! 6. no duplicate (service type, cloud, region, unit) keys

use std::collections::HashSet;
use std::io::Read;

use thiserror::Error;

use crate::models::{PricingRate, ServiceType, CREDITS_CURRENCY};

/// Columns an edited grid must carry, in export order
pub const REQUIRED_COLUMNS: [&str; 6] = ["SERVICE_TYPE", "CLOUD", "REGION", "UNIT", "RATE", "CURRENCY"];

/// Reasons an edited grid is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No complete rows to save")]
    NoRows,

    #[error("Row {row}: unknown service type '{value}'")]
    UnknownServiceType { row: usize, value: String },

    #[error("Row {row}: rate '{value}' is not a number")]
    InvalidRate { row: usize, value: String },

    #[error("Row {row}: rate must be greater than zero (got {rate})")]
    NonPositiveRate { row: usize, rate: f64 },

    #[error("Row {row}: currency must be {expected} (got '{currency}')", expected = CREDITS_CURRENCY)]
    InvalidCurrency { row: usize, currency: String },

    #[error("Duplicate pricing key: {service_type}/{cloud}/{region}/{unit}")]
    DuplicateKey {
        service_type: String,
        cloud: String,
        region: String,
        unit: String,
    },

    #[error("Failed to read pricing grid: {0}")]
    Malformed(String),
}

/// Loosely-typed edited table as it comes out of the edit grid
///
/// Blank cells are `None`. Headers are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl PricingGrid {
    /// Build a grid from existing rates, in the layout `pricing export` writes
    pub fn from_rates(rates: &[PricingRate]) -> Self {
        Self {
            headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rates
                .iter()
                .map(|r| {
                    vec![
                        Some(r.service_type.as_str().to_string()),
                        Some(r.cloud.clone()),
                        Some(r.region.clone()),
                        Some(r.unit.clone()),
                        Some(r.rate.to_string()),
                        Some(r.currency.clone()),
                    ]
                })
                .collect(),
        }
    }

    /// Parse a headed CSV into a grid
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ValidationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ValidationError::Malformed(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| ValidationError::Malformed(e.to_string()))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| if cell.is_empty() { None } else { Some(cell.to_string()) })
                    .collect(),
            );
        }

        Ok(Self { headers, rows })
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

/// Row that survived the null filter, with its 1-based grid position
struct CandidateRow {
    row: usize,
    service_type: String,
    cloud: String,
    region: String,
    unit: String,
    rate: String,
    currency: String,
}

/// Validate an edited grid into the rate set that will replace the table
pub fn validate_grid(grid: &PricingGrid) -> Result<Vec<PricingRate>, ValidationError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| grid.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let indices: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| grid.column_index(c))
        .collect();

    let cell = |row: &[Option<String>], col: usize| -> Option<String> {
        row.get(indices[col])
            .cloned()
            .flatten()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut candidates = Vec::new();
    let mut dropped = 0usize;
    for (i, row) in grid.rows.iter().enumerate() {
        let fields: Vec<Option<String>> = (0..REQUIRED_COLUMNS.len()).map(|c| cell(row, c)).collect();
        if fields.iter().any(Option::is_none) {
            dropped += 1;
            continue;
        }
        let mut fields = fields.into_iter().flatten();
        let mut next = || fields.next().unwrap_or_default();
        candidates.push(CandidateRow {
            row: i + 1,
            service_type: next().to_uppercase(),
            cloud: next().to_uppercase(),
            region: next(),
            unit: next(),
            rate: next(),
            currency: next().to_uppercase(),
        });
    }
    if dropped > 0 {
        tracing::info!("Dropped {} incomplete pricing rows", dropped);
    }
    if candidates.is_empty() {
        return Err(ValidationError::NoRows);
    }

    let mut parsed = Vec::with_capacity(candidates.len());
    for c in &candidates {
        let service_type: ServiceType =
            c.service_type
                .parse()
                .map_err(|_| ValidationError::UnknownServiceType {
                    row: c.row,
                    value: c.service_type.clone(),
                })?;
        let rate = c
            .rate
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .ok_or_else(|| ValidationError::InvalidRate {
                row: c.row,
                value: c.rate.clone(),
            })?;
        parsed.push((c, service_type, rate));
    }

    if let Some((c, _, rate)) = parsed.iter().find(|(_, _, rate)| !(*rate > 0.0)) {
        return Err(ValidationError::NonPositiveRate { row: c.row, rate: *rate });
    }

    if let Some((c, _, _)) = parsed.iter().find(|(c, _, _)| c.currency != CREDITS_CURRENCY) {
        return Err(ValidationError::InvalidCurrency {
            row: c.row,
            currency: c.currency.clone(),
        });
    }

    let mut keys = HashSet::new();
    for (c, service_type, _) in &parsed {
        let key = (*service_type, c.cloud.clone(), c.region.to_lowercase(), c.unit.clone());
        if !keys.insert(key) {
            return Err(ValidationError::DuplicateKey {
                service_type: service_type.to_string(),
                cloud: c.cloud.clone(),
                region: c.region.clone(),
                unit: c.unit.clone(),
            });
        }
    }

    Ok(parsed
        .into_iter()
        .map(|(c, service_type, rate)| PricingRate {
            service_type,
            cloud: c.cloud.clone(),
            region: c.region.clone(),
            unit: c.unit.clone(),
            rate,
            currency: c.currency.clone(),
            updated_at: None,
        })
        .collect())
}

/// Whether the role may replace the pricing table
pub fn is_privileged(role: &str, privileged_roles: &[String]) -> bool {
    let role = role.trim();
    privileged_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
}
