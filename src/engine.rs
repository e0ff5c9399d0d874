//! Cost estimation engine
//!
//! Pure computation over an explicit context: the rate table, the database
//! metadata and the caller's source region. Nothing here touches storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::context::CurrentRegion;
use crate::metrics::cost::{compute_breakdown, project, validate_price_per_credit, ComponentRates, EstimateInputs};
use crate::models::pricing::refreshed_at;
use crate::models::{Assumptions, CostEstimate, DatabaseInfo, PricingRate, ServiceType};
use crate::pricing::{lookup, RateLookup};
use crate::CommandError;

/// Everything the engine reads
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    pub rates: &'a [PricingRate],
    pub databases: &'a [DatabaseInfo],
    pub source: &'a CurrentRegion,
}

/// Replication target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub cloud: String,
    pub region: String,
}

/// One estimate request as chosen in the UI controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub databases: Vec<String>,
    pub destination: Option<Destination>,
    pub daily_change_pct: f64,
    pub refresh_per_day: f64,
    pub price_per_credit: f64,
}

/// Resolve a destination from the dropdown values
///
/// A region without a cloud takes the cloud of the first pricing row for that
/// region. No region means no destination.
pub fn resolve_destination(
    rates: &[PricingRate],
    cloud: Option<&str>,
    region: Option<&str>,
) -> Result<Option<Destination>, CommandError> {
    match (cloud, region) {
        (_, None) => Ok(None),
        (Some(cloud), Some(region)) => Ok(Some(Destination {
            cloud: cloud.trim().to_uppercase(),
            region: region.trim().to_string(),
        })),
        (None, Some(region)) => rates
            .iter()
            .find(|r| r.matches_region(region.trim()))
            .map(|r| {
                Some(Destination {
                    cloud: r.cloud.to_uppercase(),
                    region: region.trim().to_string(),
                })
            })
            .ok_or_else(|| {
                CommandError::InvalidInput(format!(
                    "No pricing rows for destination region '{}'; pass the cloud explicitly",
                    region
                ))
            }),
    }
}

/// Total size of the selected databases, with duplicate selections counted once
pub fn selected_size_tb(
    databases: &[DatabaseInfo],
    names: &[String],
) -> Result<(Vec<String>, f64), CommandError> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    let mut total = 0.0;

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let db = databases
            .iter()
            .find(|d| &d.name == name)
            .ok_or_else(|| CommandError::DatabaseNotFound(name.clone()))?;
        total += db.size_tb;
        selected.push(db.name.clone());
    }

    Ok((selected, total))
}

/// Look up the four component rates
///
/// Transfer and compute are priced at the source; storage and serverless at
/// the destination, or missing when there is none.
pub fn component_rates(
    rates: &[PricingRate],
    source: &CurrentRegion,
    destination: Option<&Destination>,
) -> ComponentRates {
    let at_destination = |service_type: ServiceType| match destination {
        Some(d) => lookup(rates, service_type, &d.cloud, &d.region),
        None => RateLookup::missing(),
    };

    ComponentRates {
        transfer: lookup(rates, ServiceType::DataTransfer, &source.cloud, &source.region),
        compute: lookup(rates, ServiceType::ReplicationCompute, &source.cloud, &source.region),
        storage: at_destination(ServiceType::StorageTbMonth),
        serverless: at_destination(ServiceType::ServerlessMaint),
    }
}

/// Compute a full estimate
pub fn build_estimate(ctx: &EngineContext<'_>, request: &EstimateRequest) -> Result<CostEstimate, CommandError> {
    validate_price_per_credit(request.price_per_credit)?;

    let (selected, total_size_tb) = selected_size_tb(ctx.databases, &request.databases)?;
    let inputs = EstimateInputs::new(total_size_tb, request.daily_change_pct, request.refresh_per_day);
    inputs.validate()?;

    let rates = component_rates(ctx.rates, ctx.source, request.destination.as_ref());
    for (name, rate) in [
        ("transfer", &rates.transfer),
        ("compute", &rates.compute),
        ("storage", &rates.storage),
        ("serverless", &rates.serverless),
    ] {
        if rate.is_estimate {
            tracing::warn!("{} rate is an estimate ({:?} match)", name, rate.tier);
        }
    }

    let breakdown = compute_breakdown(&inputs, &rates);
    let projection = project(&breakdown);

    Ok(CostEstimate {
        assumptions: Assumptions {
            source_cloud: ctx.source.cloud.clone(),
            source_region: ctx.source.region.clone(),
            destination_cloud: request.destination.as_ref().map(|d| d.cloud.clone()),
            destination_region: request.destination.as_ref().map(|d| d.region.clone()),
            databases: selected,
            total_size_tb,
            daily_change_pct: inputs.daily_change_pct,
            refresh_per_day: inputs.refresh_per_day,
            change_tb_per_refresh: inputs.change_tb_per_refresh(),
            daily_transfer_tb: inputs.daily_transfer_tb(),
            price_per_credit: request.price_per_credit,
        },
        usd: projection.to_usd(request.price_per_credit),
        breakdown,
        projection,
        pricing_refreshed_at: refreshed_at(ctx.rates),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_rates() -> Vec<PricingRate> {
        vec![
            PricingRate::new(ServiceType::DataTransfer, "AWS", "us-east-1", "TB", 0.02),
            PricingRate::new(ServiceType::ReplicationCompute, "AWS", "us-east-1", "TB", 0.05),
            PricingRate::new(ServiceType::StorageTbMonth, "AWS", "us-west-2", "TB-month", 23.0),
            PricingRate::new(ServiceType::ServerlessMaint, "AWS", "us-west-2", "TB-month", 1.5),
        ]
    }

    fn databases() -> Vec<DatabaseInfo> {
        vec![DatabaseInfo::new("SALES", 4.0), DatabaseInfo::new("ANALYTICS", 6.0)]
    }

    fn request(destination: Option<Destination>) -> EstimateRequest {
        EstimateRequest {
            databases: vec!["SALES".to_string(), "ANALYTICS".to_string()],
            destination,
            daily_change_pct: 5.0,
            refresh_per_day: 2.0,
            price_per_credit: 3.0,
        }
    }

    fn us_west_2() -> Option<Destination> {
        Some(Destination {
            cloud: "AWS".to_string(),
            region: "us-west-2".to_string(),
        })
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let rates = scenario_rates();
        let dbs = databases();
        let source: CurrentRegion = "AWS_US_EAST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };

        let estimate = build_estimate(&ctx, &request(us_west_2())).unwrap();

        assert!((estimate.assumptions.total_size_tb - 10.0).abs() < 1e-9);
        assert!((estimate.assumptions.daily_transfer_tb - 1.0).abs() < 1e-9);
        assert!((estimate.projection.monthly_total - 247.1).abs() < 1e-9);
        assert!((estimate.projection.annual_total - 2965.2).abs() < 1e-9);
        assert!((estimate.usd.monthly_total - 741.3).abs() < 1e-9);
        assert!(!estimate.is_estimate());
    }

    #[test]
    fn test_no_destination_prices_storage_at_zero() {
        let rates = scenario_rates();
        let dbs = databases();
        let source: CurrentRegion = "AWS_US_EAST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };

        let estimate = build_estimate(&ctx, &request(None)).unwrap();

        assert_eq!(estimate.breakdown.storage.credits, 0.0);
        assert!(estimate.breakdown.storage.is_estimate);
        assert_eq!(estimate.breakdown.serverless.credits, 0.0);
        assert!(estimate.assumptions.destination_region.is_none());
    }

    #[test]
    fn test_destination_without_storage_rows() {
        let rates: Vec<PricingRate> = scenario_rates()
            .into_iter()
            .filter(|r| r.service_type != ServiceType::StorageTbMonth)
            .collect();
        let dbs = databases();
        let source: CurrentRegion = "AWS_US_EAST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };

        let estimate = build_estimate(&ctx, &request(us_west_2())).unwrap();

        assert_eq!(estimate.breakdown.storage.credits, 0.0);
        assert!(estimate.breakdown.storage.is_estimate);
        assert!(!estimate.breakdown.serverless.is_estimate);
    }

    #[test]
    fn test_source_fallback_flags_estimate() {
        let rates = scenario_rates();
        let dbs = databases();
        let source: CurrentRegion = "AWS_EU_WEST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };

        let estimate = build_estimate(&ctx, &request(us_west_2())).unwrap();

        assert!(estimate.breakdown.transfer.is_estimate);
        assert!((estimate.breakdown.transfer.credits - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_database() {
        let rates = scenario_rates();
        let dbs = databases();
        let source: CurrentRegion = "AWS_US_EAST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };
        let mut req = request(None);
        req.databases.push("MISSING".to_string());

        assert!(matches!(
            build_estimate(&ctx, &req),
            Err(CommandError::DatabaseNotFound(name)) if name == "MISSING"
        ));
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        let rates = scenario_rates();
        let dbs = databases();
        let source: CurrentRegion = "AWS_US_EAST_1".parse().unwrap();
        let ctx = EngineContext { rates: &rates, databases: &dbs, source: &source };

        let mut req = request(None);
        req.price_per_credit = 0.1;
        assert!(matches!(build_estimate(&ctx, &req), Err(CommandError::InvalidInput(_))));

        let mut req = request(None);
        req.refresh_per_day = 30.0;
        assert!(matches!(build_estimate(&ctx, &req), Err(CommandError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_selection_counted_once() {
        let dbs = databases();
        let names = vec!["SALES".to_string(), "SALES".to_string()];

        let (selected, total) = selected_size_tb(&dbs, &names).unwrap();
        assert_eq!(selected, vec!["SALES".to_string()]);
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_selection_is_zero() {
        let (selected, total) = selected_size_tb(&databases(), &[]).unwrap();
        assert!(selected.is_empty());
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_resolve_destination() {
        let rates = scenario_rates();

        assert_eq!(resolve_destination(&rates, None, None).unwrap(), None);
        assert_eq!(
            resolve_destination(&rates, None, Some("US-WEST-2")).unwrap(),
            Some(Destination {
                cloud: "AWS".to_string(),
                region: "US-WEST-2".to_string(),
            })
        );
        assert_eq!(
            resolve_destination(&rates, Some("gcp"), Some("us-central1")).unwrap(),
            Some(Destination {
                cloud: "GCP".to_string(),
                region: "us-central1".to_string(),
            })
        );
        assert!(resolve_destination(&rates, None, Some("mars-1")).is_err());
    }
}
