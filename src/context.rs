//! Session context
//!
//! Role and region are resolved once per invocation and passed explicitly to
//! the engine instead of being looked up from ambient session state.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid region identifier '{0}': expected CLOUD_REGION_NAME, e.g. AWS_US_EAST_1")]
pub struct InvalidRegionId(pub String);

/// Cloud and region parsed from a warehouse region identifier
///
/// `AWS_US_EAST_1` splits on the first underscore into cloud `AWS` and
/// region `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentRegion {
    pub cloud: String,
    pub region: String,
}

impl FromStr for CurrentRegion {
    type Err = InvalidRegionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (cloud, rest) = trimmed
            .split_once('_')
            .ok_or_else(|| InvalidRegionId(s.to_string()))?;

        if cloud.is_empty() || rest.is_empty() || rest.split('_').any(str::is_empty) {
            return Err(InvalidRegionId(s.to_string()));
        }

        Ok(Self {
            cloud: cloud.to_uppercase(),
            region: rest.to_lowercase().replace('_', "-"),
        })
    }
}

impl fmt::Display for CurrentRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cloud, self.region)
    }
}

/// Who is asking and from where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub role: String,
    pub source: CurrentRegion,
}

impl SessionContext {
    pub fn new(role: impl Into<String>, region_id: &str) -> Result<Self, InvalidRegionId> {
        Ok(Self {
            role: role.into(),
            source: region_id.parse()?,
        })
    }
}
