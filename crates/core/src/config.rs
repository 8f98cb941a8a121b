//! Engine configuration.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Settings that shape how statements are compiled and evaluated.
///
/// Passed explicitly to the engine; there is no global configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Schema assumed for one-part table names.
    pub default_schema: String,
    /// Fractional digits kept by division and AVG.
    pub decimal_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_schema: "SA".to_string(),
            decimal_scale: 10,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| Error::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the default schema.
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Sets the decimal scale.
    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = scale;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.default_schema.is_empty() {
            return Err(Error::invalid_config("default_schema must not be empty"));
        }
        // rust_decimal keeps at most 28 fractional digits
        if self.decimal_scale > 28 {
            return Err(Error::invalid_config(format!(
                "decimal_scale {} exceeds 28",
                self.decimal_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_schema, "SA");
        assert_eq!(config.decimal_scale, 10);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"default_schema": "book"}"#).unwrap();
        assert_eq!(config.default_schema, "book");
        assert_eq!(config.decimal_scale, 10);

        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(EngineConfig::from_json(r#"{"decimal_scale": 40}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"default_schema": ""}"#).is_err());
    }
}
