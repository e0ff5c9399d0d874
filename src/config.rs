//! Application configuration
//!
//! Layered as: built-in defaults, then an optional TOML file, then
//! `REPLCOST__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::cost::{validate_price_per_credit, MAX_PRICE_PER_CREDIT, MIN_PRICE_PER_CREDIT};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "replication-cost.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub admin: AdminConfig,
    pub cache: CacheConfig,
    pub estimate: EstimateConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; falls back to the per-user data directory
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Current region identifier, e.g. AWS_US_EAST_1
    pub region: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Roles allowed to replace the pricing table
    pub privileged_roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub pricing_ttl_secs: u64,
    pub metadata_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub price_per_credit: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            region: "AWS_US_EAST_1".to_string(),
            role: "PUBLIC".to_string(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            privileged_roles: vec!["ACCOUNTADMIN".to_string(), "SYSADMIN".to_string()],
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            pricing_ttl_secs: 300,
            metadata_ttl_secs: 600,
        }
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            price_per_credit: 4.00,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
            session: SessionConfig::default(),
            admin: AdminConfig::default(),
            cache: CacheConfig::default(),
            estimate: EstimateConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(crate::db::default_db_path)
    }

    pub fn pricing_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.pricing_ttl_secs)
    }

    pub fn metadata_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.metadata_ttl_secs)
    }
}

/// Load configuration from `path` (or the default file if present) and the environment
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("REPLCOST").separator("__"))
        .build()?;

    let cfg: AppConfig = settings.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &AppConfig) -> anyhow::Result<()> {
    if validate_price_per_credit(cfg.estimate.price_per_credit).is_err() {
        anyhow::bail!(
            "estimate.price_per_credit must be between {:.2} and {:.2} (got {})",
            MIN_PRICE_PER_CREDIT,
            MAX_PRICE_PER_CREDIT,
            cfg.estimate.price_per_credit
        );
    }

    if cfg.admin.privileged_roles.is_empty() {
        anyhow::bail!("admin.privileged_roles must name at least one role");
    }

    if cfg.admin.privileged_roles.iter().any(|r| r.trim().is_empty()) {
        anyhow::bail!("admin.privileged_roles cannot contain an empty role name");
    }

    if cfg.session.region.parse::<crate::context::CurrentRegion>().is_err() {
        anyhow::bail!(
            "session.region '{}' is not a valid region identifier (expected e.g. AWS_US_EAST_1)",
            cfg.session.region
        );
    }

    Ok(())
}
