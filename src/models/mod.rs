//! Data models module
//!
//! Contains all data structures used throughout the application:
//! - Pricing rates and service types
//! - Database size metadata
//! - Derived cost breakdowns and projections

pub mod database;
pub mod estimate;
pub mod pricing;

pub use database::DatabaseInfo;
pub use estimate::{Assumptions, CostBreakdown, CostEstimate, CostLine, MonthlyProjection, UsdProjection};
pub use pricing::{PricingRate, ServiceType, CREDITS_CURRENCY};
