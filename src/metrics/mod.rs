//! Metrics calculation module
//!
//! This module handles the cost arithmetic:
//! - Daily per-component cost from size, change rate and refresh frequency
//! - Monthly and annual projection
//! - Input range checks for the UI-bounded parameters

pub mod cost;

pub use cost::{
    compute_breakdown, project, validate_price_per_credit, ComponentRates, EstimateInputs,
    InputError, DAYS_PER_MONTH, MONTHS_PER_YEAR,
};
