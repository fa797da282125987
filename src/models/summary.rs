//! Derived aggregate types.
//!
//! Everything in this module is recomputed from a [`LedgerSnapshot`] on every
//! read and is never persisted. Valuated entries carry the resolved names
//! of their references so that summaries can be displayed without another
//! lookup.
//!
//! [`LedgerSnapshot`]: super::LedgerSnapshot

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BillingUnit, EmployeeCategory};

/// Returns `part / whole × 100`, or zero when `whole` is zero.
///
/// ```
/// use billing_engine::models::percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percentage(Decimal::new(25, 0), Decimal::new(200, 0)), Decimal::new(125, 1));
/// assert_eq!(percentage(Decimal::new(25, 0), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// A time entry with its references resolved and its money computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuatedTimeEntry {
    /// Source entry id.
    pub entry_id: String,
    /// Employee id.
    pub employee_id: String,
    /// Employee display name.
    pub employee_name: String,
    /// Employee title.
    pub employee_title: String,
    /// Employee category.
    pub employee_category: EmployeeCategory,
    /// Job id.
    pub job_id: String,
    /// Job billing number.
    pub job_number: String,
    /// Job name.
    pub job_name: String,
    /// Hour type id.
    pub hour_type_id: String,
    /// Hour type name.
    pub hour_type_name: String,
    /// Province id.
    pub province_id: String,
    /// Province name.
    pub province_name: String,
    /// Date worked.
    pub date: NaiveDate,
    /// Raw hours.
    pub hours: Decimal,
    /// Hours after the hour-type multiplier.
    pub effective_hours: Decimal,
    /// LOA units on the entry.
    pub loa_count: u32,
    /// Cost rate after any night-shift premium.
    pub cost_rate: Decimal,
    /// Billable rate after any night-shift premium.
    pub billable_rate: Decimal,
    /// Flat LOA amount included in both totals.
    pub loa_amount: Decimal,
    /// Total cost including LOA.
    pub total_cost: Decimal,
    /// Total billable including LOA; zero on non-billable jobs.
    pub total_billable: Decimal,
}

/// Running sums for a rollup bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupTotals {
    /// Summed raw hours.
    pub hours: Decimal,
    /// Summed effective hours.
    pub effective_hours: Decimal,
    /// Summed cost.
    pub cost: Decimal,
    /// Summed billable.
    pub billable: Decimal,
    /// Summed LOA units.
    pub loa_count: u64,
    /// Number of entries folded in.
    pub entry_count: usize,
}

impl RollupTotals {
    /// Folds one valuated entry into the totals.
    pub fn add(&mut self, entry: &ValuatedTimeEntry) {
        self.hours += entry.hours;
        self.effective_hours += entry.effective_hours;
        self.cost += entry.total_cost;
        self.billable += entry.total_billable;
        self.loa_count += u64::from(entry.loa_count);
        self.entry_count += 1;
    }

    /// Adds another set of totals to these.
    pub fn merge(&mut self, other: &RollupTotals) {
        self.hours += other.hours;
        self.effective_hours += other.effective_hours;
        self.cost += other.cost;
        self.billable += other.billable;
        self.loa_count += other.loa_count;
        self.entry_count += other.entry_count;
    }

    /// Billable minus cost.
    pub fn profit(&self) -> Decimal {
        self.billable - self.cost
    }

    /// Profit as a percentage of billable; zero when nothing was billed.
    pub fn margin_percent(&self) -> Decimal {
        percentage(self.profit(), self.billable)
    }

    /// This bucket's cost as a percentage of `total`'s cost.
    pub fn share_of(&self, total: &RollupTotals) -> Decimal {
        percentage(self.cost, total.cost)
    }
}

/// Rollup by employee × job × hour type × province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntrySummary {
    /// Employee id.
    pub employee_id: String,
    /// Employee display name.
    pub employee_name: String,
    /// Job id.
    pub job_id: String,
    /// Job billing number.
    pub job_number: String,
    /// Hour type id.
    pub hour_type_id: String,
    /// Hour type name.
    pub hour_type_name: String,
    /// Province id.
    pub province_id: String,
    /// Province name.
    pub province_name: String,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Source entries, for drill-down.
    pub entries: Vec<ValuatedTimeEntry>,
}

/// Rollup by employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummaryByEmployee {
    /// Employee id.
    pub employee_id: String,
    /// Employee display name.
    pub employee_name: String,
    /// Employee title.
    pub title: String,
    /// Employee category at aggregation time.
    pub category: EmployeeCategory,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Source entries, for drill-down.
    pub entries: Vec<ValuatedTimeEntry>,
}

/// Rollup by job, with a nested breakdown per employee name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummaryByJob {
    /// Job id.
    pub job_id: String,
    /// Job billing number.
    pub job_number: String,
    /// Job name.
    pub job_name: String,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Per-employee totals within the job, keyed by employee name.
    pub employee_breakdown: BTreeMap<String, RollupTotals>,
    /// Source entries, for drill-down.
    pub entries: Vec<ValuatedTimeEntry>,
}

/// Rollup by employee title × job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleJobSummary {
    /// Employee title.
    pub title: String,
    /// Job id.
    pub job_id: String,
    /// Job billing number.
    pub job_number: String,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Source entries, for drill-down.
    pub entries: Vec<ValuatedTimeEntry>,
}

/// Rollup by date × employee name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEmployeeSummary {
    /// Date worked.
    pub date: NaiveDate,
    /// Employee display name.
    pub employee_name: String,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Source entries, for drill-down.
    pub entries: Vec<ValuatedTimeEntry>,
}

/// A rental entry with its references resolved and its money computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuatedRentalEntry {
    /// Source rental entry id.
    pub entry_id: String,
    /// Rental item id.
    pub rental_item_id: String,
    /// Rental item name.
    pub item_name: String,
    /// Job id.
    pub job_id: String,
    /// Job billing number.
    pub job_number: String,
    /// Supplying employee, when it resolves.
    pub employee_id: Option<String>,
    /// Start of the rental.
    pub start_date: NaiveDateTime,
    /// End of the rental.
    pub end_date: NaiveDateTime,
    /// Calendar date the rental is reported against.
    pub activity_date: NaiveDate,
    /// Billing unit.
    pub billing_unit: BillingUnit,
    /// Duration in billing units.
    pub duration: Decimal,
    /// Number of units rented.
    pub quantity: Decimal,
    /// Rate charged per unit of duration.
    pub rate_used: Decimal,
    /// `duration × quantity × rate_used`.
    pub total_cost: Decimal,
    /// Billable amount; equals `total_cost` except on non-billable jobs.
    pub total_billable: Decimal,
    /// `dsp_rate × duration × quantity`, zero without a DSP rate.
    pub dsp_earnings: Decimal,
}

/// Rollup of rentals by job or by item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalSummary {
    /// Grouping key (a job id or a rental item id).
    pub key: String,
    /// Display label for the key.
    pub label: String,
    /// Summed quantity.
    pub total_quantity: Decimal,
    /// Summed duration, in each rental's own billing unit.
    pub total_duration: Decimal,
    /// Summed cost.
    pub total_cost: Decimal,
    /// Summed billable.
    pub total_billable: Decimal,
    /// Summed DSP payout.
    pub total_dsp_earnings: Decimal,
    /// Source rentals.
    pub entries: Vec<ValuatedRentalEntry>,
}

/// An employee's rollup positioned in the manager hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeHierarchySummary {
    /// Employee id.
    pub employee_id: String,
    /// Employee display name.
    pub employee_name: String,
    /// Employee title.
    pub title: String,
    /// Employee category.
    pub category: EmployeeCategory,
    /// The employee's own labor totals.
    pub totals: RollupTotals,
    /// GST owed on the employee's cost.
    pub gst_amount: Decimal,
    /// Rental payout owed to the employee.
    pub dsp_earnings: Decimal,
    /// Subordinates rolled up under this employee (roots only).
    pub subordinates: Vec<EmployeeHierarchySummary>,
    /// Sum of the subordinates' GST.
    pub subordinate_gst_total: Decimal,
    /// Sum of the subordinates' DSP earnings.
    pub subordinate_dsp_total: Decimal,
}

impl EmployeeHierarchySummary {
    /// Own totals plus every subordinate's totals.
    pub fn team_totals(&self) -> RollupTotals {
        let mut team = self.totals.clone();
        for subordinate in &self.subordinates {
            team.merge(&subordinate.team_totals());
        }
        team
    }

    /// Own GST plus the subordinates' GST.
    pub fn team_gst(&self) -> Decimal {
        self.gst_amount + self.subordinate_gst_total
    }
}

/// All activity on one job for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDateInfo {
    /// The activity date.
    pub date: NaiveDate,
    /// Summed raw hours.
    pub total_hours: Decimal,
    /// Summed effective hours.
    pub effective_hours: Decimal,
    /// Summed LOA units.
    pub loa_count: u64,
    /// Labor cost, LOA included.
    pub labor_cost: Decimal,
    /// Labor billable, LOA included.
    pub labor_billable: Decimal,
    /// Rental cost.
    pub rental_cost: Decimal,
    /// Rental billable.
    pub rental_billable: Decimal,
    /// `labor_billable + rental_billable`.
    pub total_billable: Decimal,
    /// Whether the date is in the job's invoiced set.
    pub is_invoiced: bool,
    /// Number of time entries on the date.
    pub time_entry_count: usize,
    /// Number of rentals reported on the date.
    pub rental_count: usize,
}

/// Invoiced vs. uninvoiced split of a job's activity dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInvoiceStats {
    /// Number of activity dates.
    pub total_dates: usize,
    /// Number of invoiced activity dates.
    pub invoiced_dates: usize,
    /// Number of uninvoiced activity dates.
    pub uninvoiced_dates: usize,
    /// Invoiced dates as a percentage of all activity dates.
    pub percent_invoiced: Decimal,
    /// Hours on invoiced dates.
    pub invoiced_hours: Decimal,
    /// Hours on uninvoiced dates.
    pub uninvoiced_hours: Decimal,
    /// Labor cost on invoiced dates.
    pub invoiced_cost: Decimal,
    /// Labor cost on uninvoiced dates.
    pub uninvoiced_cost: Decimal,
    /// Billable on invoiced dates.
    pub invoiced_billable: Decimal,
    /// Billable on uninvoiced dates.
    pub uninvoiced_billable: Decimal,
}
