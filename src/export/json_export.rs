//! JSON export functionality

use std::path::Path;

use crate::models::CostEstimate;
use crate::CommandError;

/// Pretty-printed JSON for an estimate
pub fn estimate_to_json(estimate: &CostEstimate) -> Result<String, CommandError> {
    serde_json::to_string_pretty(estimate)
        .map_err(|e| CommandError::Export(format!("Failed to serialize estimate: {}", e)))
}

/// Write an estimate as JSON to a file
pub fn write_estimate_json_file(estimate: &CostEstimate, path: &Path) -> Result<(), CommandError> {
    let json = estimate_to_json(estimate)?;
    std::fs::write(path, json)
        .map_err(|e| CommandError::Export(format!("Failed to write JSON file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_estimate;

    #[test]
    fn test_estimate_to_json() {
        let json = estimate_to_json(&sample_estimate()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["assumptions"]["source_cloud"], "AWS");
        assert_eq!(value["breakdown"]["storage"]["service_type"], "STORAGE_TB_MONTH");
        assert_eq!(value["projection"]["annual_total"], 2965.2);
    }

    #[test]
    fn test_json_round_trip() {
        let path = std::env::temp_dir().join("test_replication_estimate.json");
        let estimate = sample_estimate();

        write_estimate_json_file(&estimate, &path).unwrap();
        let parsed: CostEstimate = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, estimate);

        std::fs::remove_file(&path).ok();
    }
}
