//! Pricing data types
//!
//! Types representing rows of the warehouse pricing table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The only currency the pricing table may carry
pub const CREDITS_CURRENCY: &str = "CREDITS";

/// Category of billed replication cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    /// Per-TB of changed data moved to the secondary (daily)
    DataTransfer,
    /// Per-TB of changed data applied on the secondary (daily)
    ReplicationCompute,
    /// Per-TB of secondary storage (monthly)
    StorageTbMonth,
    /// Per-TB serverless maintenance on the secondary (monthly)
    ServerlessMaint,
}

impl ServiceType {
    /// Wire/database name of the service type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataTransfer => "DATA_TRANSFER",
            Self::ReplicationCompute => "REPLICATION_COMPUTE",
            Self::StorageTbMonth => "STORAGE_TB_MONTH",
            Self::ServerlessMaint => "SERVERLESS_MAINT",
        }
    }

    /// Get display name for the service type
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DataTransfer => "Data Transfer",
            Self::ReplicationCompute => "Replication Compute",
            Self::StorageTbMonth => "Storage (secondary, monthly)",
            Self::ServerlessMaint => "Serverless Maintenance (monthly)",
        }
    }

    /// Whether the rate applies to changed data per day rather than stored size per month
    pub fn is_change_driven(&self) -> bool {
        matches!(self, Self::DataTransfer | Self::ReplicationCompute)
    }

    /// Get all service types
    pub fn all() -> Vec<ServiceType> {
        vec![
            Self::DataTransfer,
            Self::ReplicationCompute,
            Self::StorageTbMonth,
            Self::ServerlessMaint,
        ]
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string is not a known service type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown service type: {0}")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DATA_TRANSFER" => Ok(Self::DataTransfer),
            "REPLICATION_COMPUTE" => Ok(Self::ReplicationCompute),
            "STORAGE_TB_MONTH" => Ok(Self::StorageTbMonth),
            "SERVERLESS_MAINT" => Ok(Self::ServerlessMaint),
            _ => Err(UnknownServiceType(s.to_string())),
        }
    }
}

/// A single pricing row
///
/// Cloud and region compare case-insensitively everywhere they are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRate {
    pub service_type: ServiceType,
    pub cloud: String,
    pub region: String,
    pub unit: String,
    pub rate: f64,
    pub currency: String,
    pub updated_at: Option<String>,
}

impl PricingRate {
    /// Create a credits-denominated rate with no update stamp
    pub fn new(
        service_type: ServiceType,
        cloud: impl Into<String>,
        region: impl Into<String>,
        unit: impl Into<String>,
        rate: f64,
    ) -> Self {
        Self {
            service_type,
            cloud: cloud.into(),
            region: region.into(),
            unit: unit.into(),
            rate,
            currency: CREDITS_CURRENCY.to_string(),
            updated_at: None,
        }
    }

    /// Grouping key used by the region ranking, `CLOUD:region`
    pub fn location_key(&self) -> String {
        format!("{}:{}", self.cloud.to_uppercase(), self.region.to_lowercase())
    }

    pub fn matches_cloud(&self, cloud: &str) -> bool {
        self.cloud.eq_ignore_ascii_case(cloud)
    }

    pub fn matches_region(&self, region: &str) -> bool {
        self.region.eq_ignore_ascii_case(region)
    }
}

/// Latest update stamp across all rows, if any row carries one
pub fn refreshed_at(rates: &[PricingRate]) -> Option<String> {
    rates.iter().filter_map(|r| r.updated_at.clone()).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_from_str() {
        assert_eq!("DATA_TRANSFER".parse::<ServiceType>().unwrap(), ServiceType::DataTransfer);
        assert_eq!(" storage_tb_month ".parse::<ServiceType>().unwrap(), ServiceType::StorageTbMonth);
        assert!("EGRESS".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_service_type_serialization() {
        let json = serde_json::to_string(&ServiceType::ServerlessMaint).unwrap();
        assert_eq!(json, "\"SERVERLESS_MAINT\"");

        let parsed: ServiceType = serde_json::from_str("\"REPLICATION_COMPUTE\"").unwrap();
        assert_eq!(parsed, ServiceType::ReplicationCompute);
    }

    #[test]
    fn test_change_driven() {
        assert!(ServiceType::DataTransfer.is_change_driven());
        assert!(ServiceType::ReplicationCompute.is_change_driven());
        assert!(!ServiceType::StorageTbMonth.is_change_driven());
        assert!(!ServiceType::ServerlessMaint.is_change_driven());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let rate = PricingRate::new(ServiceType::DataTransfer, "AWS", "us-east-1", "TB", 0.02);
        assert!(rate.matches_cloud("aws"));
        assert!(rate.matches_region("US-EAST-1"));
        assert!(!rate.matches_region("us-east-2"));
        assert_eq!(rate.location_key(), "AWS:us-east-1");
    }

    #[test]
    fn test_refreshed_at_takes_latest() {
        let mut a = PricingRate::new(ServiceType::DataTransfer, "AWS", "us-east-1", "TB", 0.02);
        let mut b = a.clone();
        a.updated_at = Some("2026-01-01T00:00:00Z".to_string());
        b.updated_at = Some("2026-02-01T00:00:00Z".to_string());
        let c = PricingRate::new(ServiceType::DataTransfer, "AWS", "us-west-2", "TB", 0.02);

        assert_eq!(refreshed_at(&[a, b, c]), Some("2026-02-01T00:00:00Z".to_string()));
        assert_eq!(refreshed_at(&[]), None);
    }
}
