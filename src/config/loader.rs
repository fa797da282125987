//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading business rules
//! from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::BusinessRules;

/// The file name read from a configuration directory.
pub const BUSINESS_RULES_FILE: &str = "business_rules.yaml";

/// Longest fixed rental month that validation accepts.
pub const MAX_DAYS_PER_MONTH: i64 = 366;

/// Loads and provides access to the engine's business rules.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── business_rules.yaml   # LOA value, GST rate, night-shift premium...
/// ```
///
/// # Example
///
/// ```no_run
/// use billing_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("GST rate: {}", loader.rules().gst_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: BusinessRules,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `business_rules.yaml` is missing
    /// - The file contains invalid YAML
    /// - A value is out of range
    ///
    /// # Example
    ///
    /// ```no_run
    /// use billing_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), billing_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let rules_path = path.as_ref().join(BUSINESS_RULES_FILE);
        let path_str = rules_path.display().to_string();

        let content = fs::read_to_string(&rules_path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses business rules from a YAML string.
    ///
    /// ```
    /// use billing_engine::config::ConfigLoader;
    /// use rust_decimal::Decimal;
    ///
    /// let loader = ConfigLoader::from_yaml_str("loa_unit_value: \"250\"").unwrap();
    /// assert_eq!(loader.rules().loa_unit_value, Decimal::new(250, 0));
    /// ```
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Returns a loader holding the standard business rules.
    pub fn defaults() -> Self {
        Self {
            rules: BusinessRules::default(),
        }
    }

    fn parse(content: &str, origin: &str) -> EngineResult<Self> {
        // An empty document means "all defaults"
        let rules = if content.trim().is_empty() {
            BusinessRules::default()
        } else {
            serde_yaml::from_str::<BusinessRules>(content).map_err(|e| {
                EngineError::ConfigParseError {
                    path: origin.to_string(),
                    message: e.to_string(),
                }
            })?
        };

        Self::validate(&rules)?;
        Ok(Self { rules })
    }

    fn validate(rules: &BusinessRules) -> EngineResult<()> {
        let non_negative = [
            ("loa_unit_value", rules.loa_unit_value),
            ("gst_rate", rules.gst_rate),
            ("night_shift_premium", rules.night_shift_premium),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EngineError::InvalidConfig {
                    field: field.to_string(),
                    message: format!("must not be negative (got {})", value),
                });
            }
        }

        if rules.gst_rate > Decimal::ONE {
            return Err(EngineError::InvalidConfig {
                field: "gst_rate".to_string(),
                message: format!("must be a fraction between 0 and 1 (got {})", rules.gst_rate),
            });
        }

        if !(1..=MAX_DAYS_PER_MONTH).contains(&rules.days_per_month) {
            return Err(EngineError::InvalidConfig {
                field: "days_per_month".to_string(),
                message: format!(
                    "must be between 1 and {} (got {})",
                    MAX_DAYS_PER_MONTH, rules.days_per_month
                ),
            });
        }

        if rules.night_shift_prefix.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "night_shift_prefix".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the loaded business rules.
    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    /// Consumes the loader and returns the business rules.
    pub fn into_rules(self) -> BusinessRules {
        self.rules
    }
}
