//! Rental item and rental entry models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The unit a rental is billed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    /// Billed per started hour.
    Hour,
    /// Billed per calendar day, inclusive of both ends.
    Day,
    /// Billed per started week.
    Week,
    /// Billed per started (fixed-length) month.
    Month,
}

impl BillingUnit {
    /// Returns the unit as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingUnit::Hour => "hour",
            BillingUnit::Day => "day",
            BillingUnit::Week => "week",
            BillingUnit::Month => "month",
        }
    }
}

/// A piece of equipment that can be rented to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalItem {
    /// Unique identifier for the item.
    pub id: String,
    /// Display name, e.g. "Light Tower".
    pub name: String,
    /// Rate offered when a new rental is recorded.
    pub default_rate: Decimal,
    /// Unit the default rate is quoted in.
    pub billing_unit: BillingUnit,
}

/// A rental of one item to one job over a span of time.
///
/// `rate_used` and `dsp_rate` are snapshots taken when the rental was
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalEntry {
    /// Unique identifier for the rental entry.
    pub id: String,
    /// The rented item.
    pub rental_item_id: String,
    /// The job the rental is charged to.
    pub job_id: String,
    /// The employee supplying or operating the item, if any.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Start of the rental.
    pub start_date: NaiveDateTime,
    /// End of the rental.
    pub end_date: NaiveDateTime,
    /// Number of units rented.
    pub quantity: Decimal,
    /// Unit the rental is billed in.
    pub billing_unit: BillingUnit,
    /// Rate charged to the job per unit of duration.
    pub rate_used: Decimal,
    /// Payout rate owed to the supplying employee, if any.
    #[serde(default)]
    pub dsp_rate: Option<Decimal>,
}
