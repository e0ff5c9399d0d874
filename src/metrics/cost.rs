//! Cost projection
//!
//! Transfer and compute are priced per TB of changed data and produce a daily
//! figure. Storage and serverless maintenance are priced per TB-month and
//! produce a monthly figure. The monthly projection multiplies only the daily
//! lines by 30; the monthly lines are added as they are.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CostBreakdown, CostLine, MonthlyProjection, ServiceType};
use crate::pricing::RateLookup;

pub const DAYS_PER_MONTH: f64 = 30.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

pub const MAX_DAILY_CHANGE_PCT: f64 = 20.0;
pub const MAX_REFRESH_PER_DAY: f64 = 24.0;
pub const MIN_PRICE_PER_CREDIT: f64 = 0.50;
pub const MAX_PRICE_PER_CREDIT: f64 = 10.00;
const SLIDER_STEP: f64 = 0.5;

/// Out-of-range estimate parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{name} must be between {min} and {max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be a multiple of {step} (got {value})")]
    OffStep {
        name: &'static str,
        value: f64,
        step: f64,
    },

    #[error("Total size must be a non-negative number (got {0})")]
    InvalidSize(f64),
}

/// User-controlled scalars of an estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateInputs {
    pub total_size_tb: f64,
    /// Percent of total size changed per refresh, 0-20 in steps of 0.5
    pub daily_change_pct: f64,
    /// Refreshes per day, 0-24 in steps of 0.5
    pub refresh_per_day: f64,
}

impl EstimateInputs {
    pub fn new(total_size_tb: f64, daily_change_pct: f64, refresh_per_day: f64) -> Self {
        Self {
            total_size_tb,
            daily_change_pct,
            refresh_per_day,
        }
    }

    /// Check every parameter against its slider bounds
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.total_size_tb.is_finite() && self.total_size_tb >= 0.0) {
            return Err(InputError::InvalidSize(self.total_size_tb));
        }
        check_slider("daily change %", self.daily_change_pct, MAX_DAILY_CHANGE_PCT)?;
        check_slider("refreshes per day", self.refresh_per_day, MAX_REFRESH_PER_DAY)?;
        Ok(())
    }

    pub fn change_tb_per_refresh(&self) -> f64 {
        self.total_size_tb * (self.daily_change_pct / 100.0)
    }

    pub fn daily_transfer_tb(&self) -> f64 {
        self.change_tb_per_refresh() * self.refresh_per_day
    }
}

fn check_slider(name: &'static str, value: f64, max: f64) -> Result<(), InputError> {
    if !(0.0..=max).contains(&value) {
        return Err(InputError::OutOfRange {
            name,
            value,
            min: 0.0,
            max,
        });
    }
    let steps = value / SLIDER_STEP;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(InputError::OffStep {
            name,
            value,
            step: SLIDER_STEP,
        });
    }
    Ok(())
}

/// Check the price per credit against its input bounds
pub fn validate_price_per_credit(price: f64) -> Result<(), InputError> {
    if !(MIN_PRICE_PER_CREDIT..=MAX_PRICE_PER_CREDIT).contains(&price) {
        return Err(InputError::OutOfRange {
            name: "price per credit",
            value: price,
            min: MIN_PRICE_PER_CREDIT,
            max: MAX_PRICE_PER_CREDIT,
        });
    }
    Ok(())
}

/// Looked-up rates for the four components
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRates {
    pub transfer: RateLookup,
    pub compute: RateLookup,
    pub storage: RateLookup,
    pub serverless: RateLookup,
}

fn line(service_type: ServiceType, quantity_tb: f64, lookup: &RateLookup) -> CostLine {
    CostLine {
        service_type,
        credits: quantity_tb * lookup.rate_or_zero(),
        rate: lookup.rate,
        unit: lookup.unit.clone(),
        is_estimate: lookup.is_estimate,
    }
}

/// Per-component costs; a missing rate prices its line at zero
pub fn compute_breakdown(inputs: &EstimateInputs, rates: &ComponentRates) -> CostBreakdown {
    let daily_transfer_tb = inputs.daily_transfer_tb();

    CostBreakdown {
        transfer: line(ServiceType::DataTransfer, daily_transfer_tb, &rates.transfer),
        compute: line(ServiceType::ReplicationCompute, daily_transfer_tb, &rates.compute),
        storage: line(ServiceType::StorageTbMonth, inputs.total_size_tb, &rates.storage),
        serverless: line(ServiceType::ServerlessMaint, inputs.total_size_tb, &rates.serverless),
    }
}

/// Monthly and annual projection of a breakdown
///
/// Change-driven lines are daily and scale by 30; the others are already monthly.
pub fn project(breakdown: &CostBreakdown) -> MonthlyProjection {
    let monthly = |line: &CostLine| {
        if line.service_type.is_change_driven() {
            line.credits * DAYS_PER_MONTH
        } else {
            line.credits
        }
    };
    let monthly_transfer = monthly(&breakdown.transfer);
    let monthly_compute = monthly(&breakdown.compute);
    let monthly_storage = monthly(&breakdown.storage);
    let monthly_serverless = monthly(&breakdown.serverless);
    let monthly_total = monthly_transfer + monthly_compute + monthly_storage + monthly_serverless;

    MonthlyProjection {
        monthly_transfer,
        monthly_compute,
        monthly_storage,
        monthly_serverless,
        monthly_total,
        annual_total: monthly_total * MONTHS_PER_YEAR,
    }
}
