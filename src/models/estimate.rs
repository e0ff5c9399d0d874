//! Estimate data types
//!
//! Derived values only. Nothing in this module is persisted.

use serde::{Deserialize, Serialize};

use super::pricing::ServiceType;

/// One priced component of the estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub service_type: ServiceType,
    /// Credits for the line's own period (daily for change-driven, monthly otherwise)
    pub credits: f64,
    /// Rate applied, `None` when no pricing row matched at any tier
    pub rate: Option<f64>,
    pub unit: Option<String>,
    /// Set when the rate came from a fallback match or was missing
    pub is_estimate: bool,
}

/// Per-component costs before projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Daily
    pub transfer: CostLine,
    /// Daily
    pub compute: CostLine,
    /// Monthly
    pub storage: CostLine,
    /// Monthly
    pub serverless: CostLine,
}

impl CostBreakdown {
    /// Lines in display order
    pub fn lines(&self) -> [&CostLine; 4] {
        [&self.transfer, &self.compute, &self.storage, &self.serverless]
    }

    /// Sum of all four lines as-is, mixing daily and monthly periods
    pub fn mixed_total(&self) -> f64 {
        self.lines().iter().map(|l| l.credits).sum()
    }

    /// True if any line relied on a fallback or missing rate
    pub fn any_estimate(&self) -> bool {
        self.lines().iter().any(|l| l.is_estimate)
    }
}

/// Monthly and annual projection in credits
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub monthly_transfer: f64,
    pub monthly_compute: f64,
    pub monthly_storage: f64,
    pub monthly_serverless: f64,
    pub monthly_total: f64,
    pub annual_total: f64,
}

impl MonthlyProjection {
    /// Convert to currency at the given price per credit
    pub fn to_usd(&self, price_per_credit: f64) -> UsdProjection {
        UsdProjection {
            price_per_credit,
            monthly_transfer: self.monthly_transfer * price_per_credit,
            monthly_compute: self.monthly_compute * price_per_credit,
            monthly_storage: self.monthly_storage * price_per_credit,
            monthly_serverless: self.monthly_serverless * price_per_credit,
            monthly_total: self.monthly_total * price_per_credit,
            annual_total: self.annual_total * price_per_credit,
        }
    }
}

/// Projection converted to USD for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsdProjection {
    pub price_per_credit: f64,
    pub monthly_transfer: f64,
    pub monthly_compute: f64,
    pub monthly_storage: f64,
    pub monthly_serverless: f64,
    pub monthly_total: f64,
    pub annual_total: f64,
}

/// Inputs the estimate was computed from, echoed back for display and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub source_cloud: String,
    pub source_region: String,
    pub destination_cloud: Option<String>,
    pub destination_region: Option<String>,
    pub databases: Vec<String>,
    pub total_size_tb: f64,
    pub daily_change_pct: f64,
    pub refresh_per_day: f64,
    pub change_tb_per_refresh: f64,
    pub daily_transfer_tb: f64,
    pub price_per_credit: f64,
}

/// Complete result of one estimate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub assumptions: Assumptions,
    pub breakdown: CostBreakdown,
    pub projection: MonthlyProjection,
    pub usd: UsdProjection,
    pub pricing_refreshed_at: Option<String>,
}

impl CostEstimate {
    pub fn is_estimate(&self) -> bool {
        self.breakdown.any_estimate()
    }
}
