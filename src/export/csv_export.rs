//! CSV export functionality
//!
//! Provides CSV serialization for estimates and the pricing grid.

use std::io::Write;
use std::path::Path;

use csv::Writer;

use super::estimate_rows;
use crate::models::{CostEstimate, PricingRate};
use crate::pricing::{PricingGrid, REQUIRED_COLUMNS};
use crate::CommandError;

fn csv_error(e: impl std::fmt::Display) -> CommandError {
    CommandError::Export(format!("Failed to write CSV record: {}", e))
}

/// Write an estimate as flat `section,item,value,credits,usd,estimate` rows
pub fn write_estimate_csv<W: Write>(estimate: &CostEstimate, out: W) -> Result<(), CommandError> {
    let mut writer = Writer::from_writer(out);

    for row in estimate_rows(estimate) {
        writer.serialize(&row).map_err(csv_error)?;
    }

    writer
        .flush()
        .map_err(|e| CommandError::Export(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// Write an estimate CSV to a file
pub fn write_estimate_csv_file(estimate: &CostEstimate, path: &Path) -> Result<(), CommandError> {
    let file = std::fs::File::create(path)
        .map_err(|e| CommandError::Export(format!("Failed to create CSV file: {}", e)))?;

    write_estimate_csv(estimate, file)
}

/// Write the pricing table in the bulk-edit grid layout
pub fn write_pricing_csv<W: Write>(rates: &[PricingRate], out: W) -> Result<(), CommandError> {
    let mut writer = Writer::from_writer(out);
    let grid = PricingGrid::from_rates(rates);

    writer.write_record(REQUIRED_COLUMNS).map_err(csv_error)?;
    for row in &grid.rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(csv_error)?;
    }

    writer
        .flush()
        .map_err(|e| CommandError::Export(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}
