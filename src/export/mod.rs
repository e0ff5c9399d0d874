//! Export module for CSV and JSON export functionality
//!
//! Provides serialization of cost estimates for download and of the
//! pricing table in the layout the admin bulk edit reads back.

pub mod csv_export;
pub mod json_export;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::{CostEstimate, CostLine};
use crate::CommandError;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(CommandError::InvalidInput(format!(
                "Invalid export format: {}. Use 'csv' or 'json'",
                s
            ))),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// One row of the flat key/value estimate export
///
/// Assumption rows fill `value`; cost rows fill `credits`, `usd` and `estimate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableCostRow {
    pub section: String,
    pub item: String,
    pub value: Option<String>,
    pub credits: Option<f64>,
    pub usd: Option<f64>,
    pub estimate: Option<bool>,
}

impl ExportableCostRow {
    fn assumption(item: &str, value: impl ToString) -> Self {
        Self {
            section: "assumptions".to_string(),
            item: item.to_string(),
            value: Some(value.to_string()),
            credits: None,
            usd: None,
            estimate: None,
        }
    }

    fn cost(section: &str, item: &str, credits: f64, price_per_credit: f64, estimate: bool) -> Self {
        Self {
            section: section.to_string(),
            item: item.to_string(),
            value: None,
            credits: Some(credits),
            usd: Some(credits * price_per_credit),
            estimate: Some(estimate),
        }
    }

    fn line(section: &str, line: &CostLine, price_per_credit: f64) -> Self {
        Self::cost(
            section,
            line.service_type.display_name(),
            line.credits,
            price_per_credit,
            line.is_estimate,
        )
    }
}

/// Flatten an estimate into export rows
pub fn estimate_rows(estimate: &CostEstimate) -> Vec<ExportableCostRow> {
    let a = &estimate.assumptions;
    let b = &estimate.breakdown;
    let p = &estimate.projection;
    let price = a.price_per_credit;
    let any_estimate = b.any_estimate();

    let mut rows = vec![
        ExportableCostRow::assumption("source_cloud", &a.source_cloud),
        ExportableCostRow::assumption("source_region", &a.source_region),
        ExportableCostRow::assumption("destination_cloud", a.destination_cloud.as_deref().unwrap_or("-")),
        ExportableCostRow::assumption("destination_region", a.destination_region.as_deref().unwrap_or("-")),
        ExportableCostRow::assumption("databases", a.databases.join(";")),
        ExportableCostRow::assumption("total_size_tb", format!("{:.3}", a.total_size_tb)),
        ExportableCostRow::assumption("daily_change_pct", a.daily_change_pct),
        ExportableCostRow::assumption("refresh_per_day", a.refresh_per_day),
        ExportableCostRow::assumption("change_tb_per_refresh", a.change_tb_per_refresh),
        ExportableCostRow::assumption("daily_transfer_tb", a.daily_transfer_tb),
        ExportableCostRow::assumption("price_per_credit", format!("{:.2}", price)),
        ExportableCostRow::assumption(
            "pricing_refreshed_at",
            estimate.pricing_refreshed_at.as_deref().unwrap_or("-"),
        ),
    ];

    rows.push(ExportableCostRow::line("daily", &b.transfer, price));
    rows.push(ExportableCostRow::line("daily", &b.compute, price));
    rows.push(ExportableCostRow::line("monthly_rate", &b.storage, price));
    rows.push(ExportableCostRow::line("monthly_rate", &b.serverless, price));
    rows.push(ExportableCostRow::cost(
        "daily",
        "Total (mix of daily/monthly)",
        b.mixed_total(),
        price,
        any_estimate,
    ));

    rows.push(ExportableCostRow::cost("monthly", "Data Transfer", p.monthly_transfer, price, b.transfer.is_estimate));
    rows.push(ExportableCostRow::cost("monthly", "Replication Compute", p.monthly_compute, price, b.compute.is_estimate));
    rows.push(ExportableCostRow::cost("monthly", "Storage", p.monthly_storage, price, b.storage.is_estimate));
    rows.push(ExportableCostRow::cost(
        "monthly",
        "Serverless Maintenance",
        p.monthly_serverless,
        price,
        b.serverless.is_estimate,
    ));
    rows.push(ExportableCostRow::cost("monthly", "Total", p.monthly_total, price, any_estimate));
    rows.push(ExportableCostRow::cost("annual", "Total", p.annual_total, price, any_estimate));

    rows
}

/// Get the default export directory (Downloads folder or temp dir)
pub fn get_export_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Generate a timestamped filename for exports
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", prefix, timestamp, extension)
}

// Re-export writers
pub use csv_export::*;
pub use json_export::*;
