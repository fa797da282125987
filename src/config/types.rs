//! Configuration types for the billing engine.
//!
//! This module contains the business-rule values that the valuators and the
//! hierarchy composer read. They are deserialized from YAML and fall back to
//! the engine's standard figures when a key is absent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default flat value of one live-out allowance unit ($200).
pub fn default_loa_unit_value() -> Decimal {
    Decimal::new(200, 0)
}

/// Default GST rate applied to non-employee cost (5%).
pub fn default_gst_rate() -> Decimal {
    Decimal::new(5, 2)
}

/// Default per-hour premium on night-shift hour types ($3).
pub fn default_night_shift_premium() -> Decimal {
    Decimal::new(3, 0)
}

/// Default hour-type name prefix that marks a night shift.
pub const DEFAULT_NIGHT_SHIFT_PREFIX: &str = "NS ";

/// Default number of days in a billing month.
pub const DEFAULT_DAYS_PER_MONTH: i64 = 30;

fn default_night_shift_prefix() -> String {
    DEFAULT_NIGHT_SHIFT_PREFIX.to_string()
}

fn default_days_per_month() -> i64 {
    DEFAULT_DAYS_PER_MONTH
}

/// Business-rule constants used throughout valuation.
///
/// # Example
///
/// ```
/// use billing_engine::config::BusinessRules;
/// use rust_decimal::Decimal;
///
/// let rules = BusinessRules::default();
/// assert_eq!(rules.loa_unit_value, Decimal::new(200, 0));
/// assert_eq!(rules.gst_rate, Decimal::new(5, 2));
/// assert_eq!(rules.night_shift_prefix, "NS ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRules {
    /// Flat amount per LOA unit, added to both cost and billable.
    #[serde(default = "default_loa_unit_value")]
    pub loa_unit_value: Decimal,
    /// GST rate on the cost of non-employee workers.
    #[serde(default = "default_gst_rate")]
    pub gst_rate: Decimal,
    /// Per-hour premium added to both base rates on night-shift hour types.
    #[serde(default = "default_night_shift_premium")]
    pub night_shift_premium: Decimal,
    /// Hour-type name prefix that marks a night shift.
    #[serde(default = "default_night_shift_prefix")]
    pub night_shift_prefix: String,
    /// Fixed month length used for month-unit rentals.
    #[serde(default = "default_days_per_month")]
    pub days_per_month: i64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            loa_unit_value: default_loa_unit_value(),
            gst_rate: default_gst_rate(),
            night_shift_premium: default_night_shift_premium(),
            night_shift_prefix: default_night_shift_prefix(),
            days_per_month: default_days_per_month(),
        }
    }
}
