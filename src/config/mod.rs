//! Configuration loading and management for the billing engine.
//!
//! The LOA unit value, GST rate, night-shift premium and rental month length
//! are business rules rather than code. They are loaded from YAML, with the
//! standard figures as defaults.
//!
//! # Example
//!
//! ```no_run
//! use billing_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("LOA unit value: {}", config.rules().loa_unit_value);
//! ```

mod loader;
mod types;

pub use loader::{BUSINESS_RULES_FILE, ConfigLoader, MAX_DAYS_PER_MONTH};
pub use types::{
    BusinessRules, DEFAULT_DAYS_PER_MONTH, DEFAULT_NIGHT_SHIFT_PREFIX, default_gst_rate,
    default_loa_unit_value, default_night_shift_premium,
};
