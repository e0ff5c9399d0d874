//! Lowest-cost region ranking and destination options

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{PricingRate, ServiceType};

/// Number of regions returned by the ranking
pub const TOP_REGIONS: usize = 3;

/// A ranked `cloud:region` with its summed raw rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRank {
    pub location: String,
    pub summed_rate: f64,
}

/// Service types ranked when the caller names none: those priced at the destination
pub fn destination_service_types() -> HashSet<ServiceType> {
    ServiceType::all()
        .into_iter()
        .filter(|t| !t.is_change_driven())
        .collect()
}

/// Rank locations by the sum of their raw rates for the given service types
///
/// Rates are summed as-is even though their units differ (per-TB vs
/// per-TB-month), so the result is an ordering hint rather than a cost.
/// Cloud and region are grouped case-insensitively. Ties keep first-seen order.
pub fn rank_regions(rates: &[PricingRate], service_types: &HashSet<ServiceType>) -> Vec<RegionRank> {
    let mut groups: Vec<RegionRank> = Vec::new();

    for row in rates.iter().filter(|r| service_types.contains(&r.service_type)) {
        let key = row.location_key();
        match groups.iter_mut().find(|g| g.location == key) {
            Some(group) => group.summed_rate += row.rate,
            None => groups.push(RegionRank {
                location: key,
                summed_rate: row.rate,
            }),
        }
    }

    groups.sort_by(|a, b| a.summed_rate.total_cmp(&b.summed_rate));
    groups.truncate(TOP_REGIONS);
    groups
}

/// Distinct (cloud, region) pairs offered as replication destinations, sorted
pub fn destinations(rates: &[PricingRate]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut pairs: Vec<(String, String)> = rates
        .iter()
        .map(|r| (r.cloud.to_uppercase(), r.region.to_lowercase()))
        .filter(|pair| seen.insert(pair.clone()))
        .collect();
    pairs.sort();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(service_type: ServiceType, cloud: &str, region: &str, value: f64) -> PricingRate {
        PricingRate::new(service_type, cloud, region, "TB", value)
    }

    fn destination_types() -> HashSet<ServiceType> {
        destination_service_types()
    }

    #[test]
    fn test_destination_service_types() {
        let types = destination_service_types();
        assert_eq!(types.len(), 2);
        assert!(types.contains(&ServiceType::StorageTbMonth));
        assert!(types.contains(&ServiceType::ServerlessMaint));
    }

    #[test]
    fn test_rank_sums_by_location() {
        let rates = vec![
            rate(ServiceType::StorageTbMonth, "AWS", "us-west-2", 23.0),
            rate(ServiceType::ServerlessMaint, "AWS", "us-west-2", 1.5),
            rate(ServiceType::StorageTbMonth, "GCP", "us-central1", 20.0),
            rate(ServiceType::DataTransfer, "GCP", "us-central1", 100.0),
        ];

        let ranked = rank_regions(&rates, &destination_types());

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].location, "GCP:us-central1");
        assert!((ranked[0].summed_rate - 20.0).abs() < 1e-9);
        assert_eq!(ranked[1].location, "AWS:us-west-2");
        assert!((ranked[1].summed_rate - 24.5).abs() < 1e-9);
    }

    #[test]
    fn test_rank_groups_location_case_insensitively() {
        let rates = vec![
            rate(ServiceType::StorageTbMonth, "AWS", "us-west-2", 23.0),
            rate(ServiceType::ServerlessMaint, "aws", "US-WEST-2", 1.5),
        ];

        let ranked = rank_regions(&rates, &destination_types());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].location, "AWS:us-west-2");
        assert!((ranked[0].summed_rate - 24.5).abs() < 1e-9);
        assert_eq!(destinations(&rates).len(), ranked.len());
    }

    #[test]
    fn test_rank_truncates_to_top_three() {
        let rates = vec![
            rate(ServiceType::StorageTbMonth, "AWS", "a", 4.0),
            rate(ServiceType::StorageTbMonth, "AWS", "b", 3.0),
            rate(ServiceType::StorageTbMonth, "AWS", "c", 2.0),
            rate(ServiceType::StorageTbMonth, "AWS", "d", 1.0),
        ];

        let ranked = rank_regions(&rates, &destination_types());

        assert_eq!(ranked.len(), TOP_REGIONS);
        let locations: Vec<&str> = ranked.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["AWS:d", "AWS:c", "AWS:b"]);
        assert!(ranked.windows(2).all(|w| w[0].summed_rate <= w[1].summed_rate));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let rates = vec![
            rate(ServiceType::StorageTbMonth, "AZURE", "westeurope", 5.0),
            rate(ServiceType::StorageTbMonth, "AWS", "eu-west-1", 5.0),
        ];

        let ranked = rank_regions(&rates, &destination_types());
        assert_eq!(ranked[0].location, "AZURE:westeurope");
        assert_eq!(ranked[1].location, "AWS:eu-west-1");
    }

    #[test]
    fn test_rank_excludes_unmatched_service_types() {
        let rates = vec![rate(ServiceType::DataTransfer, "AWS", "us-east-1", 0.02)];

        assert!(rank_regions(&rates, &destination_types()).is_empty());
        assert!(rank_regions(&rates, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_destinations_sorted_and_distinct() {
        let rates = vec![
            rate(ServiceType::StorageTbMonth, "gcp", "us-central1", 20.0),
            rate(ServiceType::ServerlessMaint, "AWS", "US-WEST-2", 1.5),
            rate(ServiceType::StorageTbMonth, "AWS", "us-west-2", 23.0),
        ];

        assert_eq!(
            destinations(&rates),
            vec![
                ("AWS".to_string(), "us-west-2".to_string()),
                ("GCP".to_string(), "us-central1".to_string()),
            ]
        );
    }
}
