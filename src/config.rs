use crate::core::member::MemberId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identity the engine spends settlement allowances as.
    pub operator: MemberId,
    pub transfer_timeout_ms: u64,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operator: MemberId::new("group-ledger"),
            transfer_timeout_ms: 5_000,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"transfer_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.transfer_timeout(), Duration::from_millis(250));
        assert_eq!(config.operator, MemberId::new("group-ledger"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/group-ledger.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
