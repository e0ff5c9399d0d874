//! Rate lookup with fallback cascade
//!
//! Rows are scanned in input order at each tier and the first hit wins:
//! 1. service type + cloud + region (exact)
//! 2. service type + cloud, any region
//! 3. service type, any cloud and region
//!
//! Anything below tier 1 is flagged as an estimate. A miss at every tier is
//! not an error; callers price it at zero.

use serde::Serialize;

use crate::models::{PricingRate, ServiceType};

/// Which tier of the cascade produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    SameCloud,
    ServiceTypeOnly,
    Missing,
}

/// Result of a rate lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLookup {
    pub rate: Option<f64>,
    pub unit: Option<String>,
    pub is_estimate: bool,
    pub tier: MatchTier,
}

impl RateLookup {
    fn found(row: &PricingRate, tier: MatchTier) -> Self {
        Self {
            rate: Some(row.rate),
            unit: Some(row.unit.clone()),
            is_estimate: tier != MatchTier::Exact,
            tier,
        }
    }

    /// Nothing matched at any tier
    pub fn missing() -> Self {
        Self {
            rate: None,
            unit: None,
            is_estimate: true,
            tier: MatchTier::Missing,
        }
    }

    /// Rate with a missing match treated as zero
    pub fn rate_or_zero(&self) -> f64 {
        self.rate.unwrap_or(0.0)
    }
}

/// Look up the rate for a service type at a cloud/region
pub fn lookup(rates: &[PricingRate], service_type: ServiceType, cloud: &str, region: &str) -> RateLookup {
    let of_type = |r: &&PricingRate| r.service_type == service_type;

    if let Some(row) = rates
        .iter()
        .filter(of_type)
        .find(|r| r.matches_cloud(cloud) && r.matches_region(region))
    {
        return RateLookup::found(row, MatchTier::Exact);
    }

    if let Some(row) = rates.iter().filter(of_type).find(|r| r.matches_cloud(cloud)) {
        tracing::debug!(
            "No exact {} rate for {}/{}, using {} from same cloud",
            service_type,
            cloud,
            region,
            row.region
        );
        return RateLookup::found(row, MatchTier::SameCloud);
    }

    if let Some(row) = rates.iter().find(|r| r.service_type == service_type) {
        tracing::debug!(
            "No {} rate for cloud {}, using {}",
            service_type,
            cloud,
            row.location_key()
        );
        return RateLookup::found(row, MatchTier::ServiceTypeOnly);
    }

    tracing::debug!("No {} rate at any tier", service_type);
    RateLookup::missing()
}
