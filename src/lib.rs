//! Replication / DR Cost Calculator
//!
//! This library projects what it costs to replicate warehouse databases to a
//! secondary region. It handles:
//! - Pricing rate lookup with fallback estimates
//! - Daily, monthly and annual cost projection
//! - Lowest-cost region ranking
//! - CSV and JSON export
//! - Role-gated bulk replacement of the pricing table
//! - TTL caching of data source reads

pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod db;
pub mod engine;
pub mod export;
pub mod metrics;
pub mod models;
pub mod pricing;

use cache::TtlCache;
use config::AppConfig;
use db::Database;
use models::{DatabaseInfo, PricingRate};

/// Application state shared by all commands
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub(crate) pricing_cache: TtlCache<Vec<PricingRate>>,
    pub(crate) metadata_cache: TtlCache<Vec<DatabaseInfo>>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            pricing_cache: TtlCache::new(config.pricing_ttl()),
            metadata_cache: TtlCache::new(config.metadata_ttl()),
            db,
            config,
        }
    }

    /// Open and initialize the configured database
    pub fn open(config: AppConfig) -> Result<Self, CommandError> {
        let db_path = config.database_path();
        tracing::info!("Database path: {:?}", db_path);

        let database = Database::new(db_path)?;
        database.initialize()?;

        Ok(Self::new(database, config))
    }
}

/// Error type for commands
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(#[from] db::DbError),

    #[error("Pricing update rejected: {0}")]
    Validation(#[from] pricing::ValidationError),

    #[error("Role '{0}' is not allowed to edit pricing (read-only view)")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<metrics::InputError> for CommandError {
    fn from(e: metrics::InputError) -> Self {
        CommandError::InvalidInput(e.to_string())
    }
}

impl From<context::InvalidRegionId> for CommandError {
    fn from(e: context::InvalidRegionId) -> Self {
        CommandError::InvalidInput(e.to_string())
    }
}

impl serde::Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Initialize logging; `RUST_LOG` wins over the configured level
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
