//! Time entry model.
//!
//! A time entry records hours worked by one employee on one job under one
//! hour type. Wages are snapshotted at entry time so that historical entries
//! do not move when an employee's rates change later.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a single labor record.
///
/// # Example
///
/// ```
/// use billing_engine::models::TimeEntry;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let entry = TimeEntry {
///     id: "te_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     job_id: "job_001".to_string(),
///     hour_type_id: "ht_reg".to_string(),
///     province_id: "ab".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
///     hours: Decimal::new(8, 0),
///     loa_count: 1,
///     billable_wage_used: Decimal::new(45, 0),
///     cost_wage_used: Decimal::new(25, 0),
///     description: None,
/// };
/// assert!(entry.has_loa());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee who worked.
    pub employee_id: String,
    /// The job the time is charged to.
    pub job_id: String,
    /// The hour type (regular, overtime, night shift...).
    pub hour_type_id: String,
    /// The province the work took place in.
    pub province_id: String,
    /// The calendar date of the work.
    pub date: NaiveDate,
    /// Raw hours, before the hour-type multiplier.
    pub hours: Decimal,
    /// Number of live-out allowance units (a count, not hours).
    #[serde(default)]
    pub loa_count: u32,
    /// Billable rate captured when the entry was recorded.
    pub billable_wage_used: Decimal,
    /// Cost rate captured when the entry was recorded.
    pub cost_wage_used: Decimal,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimeEntry {
    /// Returns true if the entry carries at least one LOA unit.
    pub fn has_loa(&self) -> bool {
        self.loa_count > 0
    }
}
