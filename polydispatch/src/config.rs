//! Registry Configuration
//!
//! Defines the options that change how a [`TypeRegistry`] resolves guards
//! and expands conversions.
//!
//! [`TypeRegistry`]: crate::registry::TypeRegistry

use serde::{Deserialize, Serialize};

use crate::error::ConfigLoadError;

/// Configuration for a type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Synthesize an is-instance-of guard for nominal types that have no
    /// registered guards, instead of failing with `UnknownType`.
    pub auto_register: bool,

    /// How far conversion edges are followed when widening a parameter.
    pub conversion_reach: ConversionReach,
}

impl RegistryConfig {
    /// Parse a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(text)?)
    }

    /// Enable or disable auto-registration of nominal types.
    pub fn with_auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    /// Set the conversion reach.
    pub fn with_conversion_reach(mut self, reach: ConversionReach) -> Self {
        self.conversion_reach = reach;
        self
    }
}

/// Conversion expansion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionReach {
    /// Only edges ending directly at a declared type are followed.
    #[default]
    SingleHop,
    /// Edges are followed until no new type is reached. Converters along a
    /// path are composed; each type is visited once, so cycles terminate.
    Transitive,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(!config.auto_register);
        assert_eq!(config.conversion_reach, ConversionReach::SingleHop);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RegistryConfig::from_toml_str("auto-register = true\n").unwrap();
        assert_eq!(
            config,
            RegistryConfig {
                auto_register: true,
                conversion_reach: ConversionReach::SingleHop,
            }
        );
    }

    #[test]
    fn test_from_toml_full() {
        let text = r#"
            auto-register = false
            conversion-reach = "transitive"
        "#;
        let config = RegistryConfig::from_toml_str(text).unwrap();
        assert_eq!(config.conversion_reach, ConversionReach::Transitive);
    }

    #[test]
    fn test_from_toml_rejects_unknown_reach() {
        let err = RegistryConfig::from_toml_str("conversion-reach = \"sideways\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid registry configuration"));
    }

    #[test]
    fn test_builders() {
        let config = RegistryConfig::default()
            .with_auto_register(true)
            .with_conversion_reach(ConversionReach::Transitive);
        assert!(config.auto_register);
        assert_eq!(config.conversion_reach, ConversionReach::Transitive);
    }
}
