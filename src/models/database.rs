//! Database size metadata

use serde::{Deserialize, Serialize};

/// Size record for a replicable database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub size_tb: f64,
    pub as_of: Option<String>,
}

impl DatabaseInfo {
    pub fn new(name: impl Into<String>, size_tb: f64) -> Self {
        Self {
            name: name.into(),
            size_tb,
            as_of: None,
        }
    }
}
