use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Number of trailing samples plotted per series unless configured.
pub const DEFAULT_TAIL_SAMPLES: usize = 100;
/// Decimal places used when rendering statistics unless configured.
pub const DEFAULT_PRECISION: usize = 3;
const MAX_PRECISION: usize = 12;

/// Session settings, read from an optional JSON file and then overridden
/// by command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub tail_samples: usize,
    pub precision: usize,
    /// Forced field delimiter, `;` or `,`. Detected per file when unset.
    pub delimiter: Option<char>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tail_samples: DEFAULT_TAIL_SAMPLES,
            precision: DEFAULT_PRECISION,
            delimiter: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::debug!("Loaded config from {:?}: {config:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "precision {} exceeds {MAX_PRECISION}",
                self.precision
            )));
        }
        if let Some(d) = self.delimiter {
            if d != ';' && d != ',' {
                return Err(ConfigError::Invalid(format!(
                    "delimiter must be ';' or ',', got '{d}'"
                )));
            }
        }
        Ok(())
    }

    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.map(|d| d as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.tail_samples, 100);
        assert_eq!(config.delimiter_byte(), None);
    }

    #[test]
    fn reads_all_fields() {
        let config =
            DashboardConfig::from_json(r#"{"tail_samples": 20, "precision": 5, "delimiter": ";"}"#)
                .unwrap();
        assert_eq!(config.tail_samples, 20);
        assert_eq!(config.precision, 5);
        assert_eq!(config.delimiter_byte(), Some(b';'));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DashboardConfig::from_json(r#"{"delimiter": "|"}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"precision": 40}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"tail": 5}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
