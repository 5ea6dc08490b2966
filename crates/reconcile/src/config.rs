use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Parse(String),
    #[error("Tolerance must not be negative: {0}")]
    InvalidTolerance(Decimal),
    #[error("Tolerated reference prefix must not be empty")]
    EmptyReferencePrefix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    /// Soft-mode near-equality threshold, in percent of the larger amount.
    pub tolerance_percent: Decimal,
    /// Committed entries whose reference starts with this prefix may vanish
    /// from a later snapshot; the bank drops them without a replacement.
    pub tolerated_reference_prefix: String,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: Decimal::ONE,
            tolerated_reference_prefix: "B".to_string(),
        }
    }
}

impl ComparatorConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ComparatorConfig =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.tolerance_percent.is_sign_negative() {
            return Err(ConfigError::InvalidTolerance(config.tolerance_percent));
        }
        if config.tolerated_reference_prefix.is_empty() {
            return Err(ConfigError::EmptyReferencePrefix);
        }
        Ok(config)
    }

    pub fn is_tolerated_reference(&self, reference: &str) -> bool {
        reference.starts_with(&self.tolerated_reference_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(ComparatorConfig::from_toml("").unwrap(), ComparatorConfig::default());
    }

    #[test]
    fn overrides_fields() {
        let config = ComparatorConfig::from_toml(
            r#"
            tolerance_percent = "2.5"
            tolerated_reference_prefix = "BX"
            "#,
        )
        .unwrap();
        assert_eq!(config.tolerance_percent, Decimal::new(25, 1));
        assert!(config.is_tolerated_reference("BX0001"));
        assert!(!config.is_tolerated_reference("B0001"));
    }

    #[test]
    fn rejects_negative_tolerance() {
        assert!(matches!(
            ComparatorConfig::from_toml(r#"tolerance_percent = "-1""#),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn rejects_empty_reference_prefix() {
        assert_eq!(
            ComparatorConfig::from_toml(r#"tolerated_reference_prefix = """#),
            Err(ConfigError::EmptyReferencePrefix)
        );
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(matches!(
            ComparatorConfig::from_toml("tolerance_percent = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_prefix_is_b() {
        let config = ComparatorConfig::default();
        assert!(config.is_tolerated_reference("B123456"));
        assert!(!config.is_tolerated_reference("A123456"));
    }
}
