//! Pricing module
//!
//! This module handles everything done against the in-memory rate table:
//! - Three-tier rate lookup with estimate flagging
//! - Lowest-cost region ranking
//! - Validation and authorization of admin bulk edits

pub mod admin;
pub mod lookup;
pub mod ranking;

pub use admin::{is_privileged, validate_grid, PricingGrid, ValidationError, REQUIRED_COLUMNS};
pub use lookup::{lookup, MatchTier, RateLookup};
pub use ranking::{destination_service_types, destinations, rank_regions, RegionRank, TOP_REGIONS};
