//! Reference tables: hour types and provinces.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An hour classification with its effective-hours multiplier.
///
/// Hour types whose name begins with the night-shift prefix (by default
/// `"NS "`) carry a flat per-hour premium on both cost and billable rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourType {
    /// Unique identifier for the hour type.
    pub id: String,
    /// Display name, e.g. "Regular", "Overtime", "NS Overtime".
    pub name: String,
    /// Effective-hours factor; absent means 1.0.
    #[serde(default)]
    pub multiplier: Option<Decimal>,
}

impl HourType {
    /// Returns the multiplier, defaulting to 1.0 when unset.
    pub fn multiplier(&self) -> Decimal {
        self.multiplier.unwrap_or(Decimal::ONE)
    }

    /// Returns true if the name carries the given night-shift prefix.
    ///
    /// ```
    /// use billing_engine::models::HourType;
    ///
    /// let hour_type = HourType {
    ///     id: "ht_ns_ot".to_string(),
    ///     name: "NS Overtime".to_string(),
    ///     multiplier: None,
    /// };
    /// assert!(hour_type.is_night_shift("NS "));
    /// assert!(!hour_type.is_night_shift("Night "));
    /// ```
    pub fn is_night_shift(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

/// A province or territory that a time entry was worked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    /// Unique identifier for the province.
    pub id: String,
    /// Display name, e.g. "Alberta".
    pub name: String,
}
