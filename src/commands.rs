//! Command handlers
//!
//! Every operation exposed to the front end. Handlers read through the TTL
//! caches, delegate computation to the engine, and turn every failure into a
//! `CommandError` the caller can show to the user.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::context::SessionContext;
use crate::db::queries;
use crate::engine::{build_estimate, EngineContext, EstimateRequest};
use crate::export::{
    generate_export_filename, get_export_directory, write_estimate_csv_file, write_estimate_json_file,
    write_pricing_csv, ExportFormat,
};
use crate::models::pricing::refreshed_at;
use crate::models::{CostEstimate, DatabaseInfo, PricingRate, ServiceType};
use crate::pricing::{destinations, is_privileged, rank_regions, validate_grid, PricingGrid, RegionRank};
use crate::AppState;
use crate::CommandError;

// ============================================================================
// Response DTOs
// ============================================================================

/// Pricing table freshness
#[derive(Debug, Clone, Serialize)]
pub struct PricingStatus {
    pub row_count: usize,
    pub refreshed_at: Option<String>,
}

/// Result of a manual pricing refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub message: String,
    pub seeded: bool,
    pub status: PricingStatus,
}

/// Result of an accepted admin save
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub rows_written: usize,
    pub updated_at: String,
}

// ============================================================================
// Cached reads
// ============================================================================

/// Pricing rows in scan order, cached for the configured TTL
pub fn get_pricing(state: &mut AppState) -> Result<Vec<PricingRate>, CommandError> {
    let db = &state.db;
    state
        .pricing_cache
        .get_or_fetch(|| db.with_connection(queries::load_pricing))
        .map_err(|e| {
            tracing::error!("Failed to load pricing: {}", e);
            CommandError::from(e)
        })
}

/// Database size metadata, cached for the configured TTL
pub fn get_databases(state: &mut AppState) -> Result<Vec<DatabaseInfo>, CommandError> {
    let db = &state.db;
    state
        .metadata_cache
        .get_or_fetch(|| db.with_connection(queries::load_databases))
        .map_err(|e| {
            tracing::error!("Failed to load database metadata: {}", e);
            CommandError::from(e)
        })
}

pub fn get_pricing_status(state: &mut AppState) -> Result<PricingStatus, CommandError> {
    let rates = get_pricing(state)?;
    Ok(PricingStatus {
        row_count: rates.len(),
        refreshed_at: refreshed_at(&rates),
    })
}

/// Re-read the pricing table, bypassing the cache
///
/// An empty table is re-seeded with the default estimated rates first.
pub fn refresh_pricing(state: &mut AppState) -> Result<RefreshOutcome, CommandError> {
    let seeded = state.db.seed_default_pricing()?;
    state.pricing_cache.invalidate();
    let status = get_pricing_status(state)?;

    let message = if seeded {
        format!("Pricing table was empty; seeded {} estimated rates", status.row_count)
    } else {
        format!("Pricing reloaded ({} rows)", status.row_count)
    };
    tracing::info!("{}", message);

    Ok(RefreshOutcome {
        message,
        seeded,
        status,
    })
}

/// Destination (cloud, region) options
pub fn get_destinations(state: &mut AppState) -> Result<Vec<(String, String)>, CommandError> {
    Ok(destinations(&get_pricing(state)?))
}

/// Top regions by summed raw rate for the given service types
pub fn get_lowest_cost_regions(
    state: &mut AppState,
    service_types: &HashSet<ServiceType>,
) -> Result<Vec<RegionRank>, CommandError> {
    Ok(rank_regions(&get_pricing(state)?, service_types))
}

// ============================================================================
// Estimates
// ============================================================================

/// Compute an estimate for the session's source region
pub fn estimate_cost(
    state: &mut AppState,
    session: &SessionContext,
    request: &EstimateRequest,
) -> Result<CostEstimate, CommandError> {
    let rates = get_pricing(state)?;
    let databases = get_databases(state)?;

    if rates.is_empty() {
        tracing::warn!("No pricing data found; every line will be a zero estimate");
    }

    let ctx = EngineContext {
        rates: &rates,
        databases: &databases,
        source: &session.source,
    };
    build_estimate(&ctx, request)
}

/// Write an estimate to `path`, or to a timestamped file in the export directory
pub fn export_estimate(
    estimate: &CostEstimate,
    format: ExportFormat,
    path: Option<&Path>,
) -> Result<PathBuf, CommandError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_export_directory().join(generate_export_filename(
            "replication_cost_estimate",
            format.extension(),
        )),
    };

    match format {
        ExportFormat::Csv => write_estimate_csv_file(estimate, &path)?,
        ExportFormat::Json => write_estimate_json_file(estimate, &path)?,
    }

    tracing::info!("Exported estimate to {:?}", path);
    Ok(path)
}

// ============================================================================
// Admin
// ============================================================================

/// Dump the pricing table in the bulk-edit grid layout
pub fn export_pricing<W: Write>(state: &mut AppState, out: W) -> Result<usize, CommandError> {
    let rates = get_pricing(state)?;
    write_pricing_csv(&rates, out)?;
    Ok(rates.len())
}

/// Replace the whole pricing table with an edited grid
///
/// The role check runs before anything is parsed. The grid is validated as
/// a whole and written in one transaction, so a rejected grid leaves the
/// table exactly as it was.
pub fn save_pricing(
    state: &mut AppState,
    session: &SessionContext,
    grid: &PricingGrid,
) -> Result<SaveOutcome, CommandError> {
    if !is_privileged(&session.role, &state.config.admin.privileged_roles) {
        tracing::warn!("Pricing edit refused for role {}", session.role);
        return Err(CommandError::Unauthorized(session.role.clone()));
    }

    let rates = validate_grid(grid).map_err(|e| {
        tracing::warn!("Pricing edit rejected: {}", e);
        e
    })?;

    let updated_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let rows_written = state
        .db
        .with_transaction(|tx| queries::replace_pricing(tx, &rates, &updated_at))?;

    state.pricing_cache.invalidate();
    tracing::info!("Pricing table replaced by {} ({} rows)", session.role, rows_written);

    Ok(SaveOutcome {
        rows_written,
        updated_at,
    })
}

/// Replace the database metadata table
pub fn import_databases(state: &mut AppState, databases: &[DatabaseInfo]) -> Result<usize, CommandError> {
    let count = state
        .db
        .with_transaction(|tx| queries::replace_databases(tx, databases))?;

    state.metadata_cache.invalidate();
    tracing::info!("Imported {} database metadata rows", count);
    Ok(count)
}
