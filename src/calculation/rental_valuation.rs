//! Rental valuation.
//!
//! This module computes rental durations in billing units, the cost and DSP
//! payout of each rental, and rollups of rentals by job and by item.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::BusinessRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BillingUnit, LedgerIndex, LedgerSnapshot, RentalEntry, RentalSummary, ValuatedRentalEntry,
};

use super::entry_valuation::MAX_ENTRY_AMOUNT;
use super::exclusion::{ExclusionReason, Valuated};

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_WEEK: i64 = MS_PER_DAY * 7;

/// Ceiling division for a non-negative numerator and positive divisor.
fn ceil_div(numerator: i64, divisor: i64) -> i64 {
    numerator / divisor + i64::from(numerator % divisor != 0)
}

/// Returns the number of billing units a rental spans.
///
/// Partial units are rounded up. Day rentals count both ends, so a rental
/// that starts and ends on the same instant is one day. Months are a fixed
/// `days_per_month` days long, not calendar months.
///
/// A negative span is treated as zero; callers validate ordering first.
///
/// # Examples
///
/// ```
/// use billing_engine::calculation::rental_duration;
/// use billing_engine::models::BillingUnit;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(17, 0, 0).unwrap();
///
/// assert_eq!(rental_duration(start, end, BillingUnit::Hour, 30), 57);
/// assert_eq!(rental_duration(start, end, BillingUnit::Day, 30), 4);
/// assert_eq!(rental_duration(start, start, BillingUnit::Day, 30), 1);
/// ```
pub fn rental_duration(
    start: NaiveDateTime,
    end: NaiveDateTime,
    unit: BillingUnit,
    days_per_month: i64,
) -> i64 {
    let elapsed = (end - start).num_milliseconds().max(0);
    match unit {
        BillingUnit::Hour => ceil_div(elapsed, MS_PER_HOUR),
        BillingUnit::Day => ceil_div(elapsed, MS_PER_DAY) + 1,
        BillingUnit::Week => ceil_div(elapsed, MS_PER_WEEK),
        BillingUnit::Month => ceil_div(elapsed, MS_PER_DAY.saturating_mul(days_per_month.max(1))),
    }
}

/// The money side of one rental.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalValuation {
    /// Duration in the rental's billing unit.
    pub duration: Decimal,
    /// `duration × quantity × rate_used`.
    pub total_cost: Decimal,
    /// `dsp_rate × duration × quantity`, zero without a DSP rate.
    pub dsp_earnings: Decimal,
}

fn reject(entry: &RentalEntry, message: String) -> EngineError {
    EngineError::InvalidRental {
        entry_id: entry.id.clone(),
        message,
    }
}

fn validate_rental(entry: &RentalEntry) -> EngineResult<()> {
    if entry.end_date < entry.start_date {
        return Err(reject(
            entry,
            format!(
                "end {} is before start {}",
                entry.end_date, entry.start_date
            ),
        ));
    }
    if entry.quantity < Decimal::ZERO {
        return Err(reject(
            entry,
            format!("quantity must not be negative (got {})", entry.quantity),
        ));
    }
    if entry.rate_used < Decimal::ZERO {
        return Err(reject(
            entry,
            format!("rate must not be negative (got {})", entry.rate_used),
        ));
    }
    if let Some(dsp_rate) = entry.dsp_rate.filter(|rate| *rate < Decimal::ZERO) {
        return Err(reject(
            entry,
            format!("DSP rate must not be negative (got {dsp_rate})"),
        ));
    }
    Ok(())
}

/// Computes the duration, cost and DSP payout of a rental.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRental`] if the rental ends before it
/// starts, has a negative quantity or rate, or if its units, cost or payout
/// overflows or exceeds [`MAX_ENTRY_AMOUNT`].
pub fn value_rental(entry: &RentalEntry, rules: &BusinessRules) -> EngineResult<RentalValuation> {
    validate_rental(entry)?;

    let duration = Decimal::from(rental_duration(
        entry.start_date,
        entry.end_date,
        entry.billing_unit,
        rules.days_per_month,
    ));
    let overflow = || reject(entry, format!("amount overflows (limit {})", MAX_ENTRY_AMOUNT));
    let units = duration.checked_mul(entry.quantity).ok_or_else(overflow)?;
    let total_cost = units.checked_mul(entry.rate_used).ok_or_else(overflow)?;
    let dsp_earnings = match entry.dsp_rate {
        Some(rate) => rate.checked_mul(units).ok_or_else(overflow)?,
        None => Decimal::ZERO,
    };
    let figures = [entry.quantity, units, total_cost, dsp_earnings];
    if figures.iter().any(|figure| *figure > MAX_ENTRY_AMOUNT) {
        return Err(overflow());
    }

    Ok(RentalValuation {
        duration,
        total_cost,
        dsp_earnings,
    })
}

fn valuate_one(
    entry: &RentalEntry,
    index: &LedgerIndex<'_>,
    rules: &BusinessRules,
) -> Result<ValuatedRentalEntry, ExclusionReason> {
    let item = index
        .rental_item(&entry.rental_item_id)
        .ok_or_else(|| ExclusionReason::UnknownRentalItem(entry.rental_item_id.clone()))?;
    let job = index
        .job(&entry.job_id)
        .ok_or_else(|| ExclusionReason::UnknownJob(entry.job_id.clone()))?;

    let valuation =
        value_rental(entry, rules).map_err(|err| ExclusionReason::Invalid(err.to_string()))?;

    // An unknown supplier loses the payout attribution, not the rental
    let employee_id = match entry.employee_id.as_deref() {
        Some(id) if index.employee(id).is_some() => Some(id.to_string()),
        Some(id) => {
            debug!(entry_id = %entry.id, employee_id = %id, "Dropping DSP attribution for unknown employee");
            None
        }
        None => None,
    };
    let dsp_earnings = if employee_id.is_some() {
        valuation.dsp_earnings
    } else {
        Decimal::ZERO
    };

    let total_billable = if job.is_billable {
        valuation.total_cost
    } else {
        Decimal::ZERO
    };

    Ok(ValuatedRentalEntry {
        entry_id: entry.id.clone(),
        rental_item_id: item.id.clone(),
        item_name: item.name.clone(),
        job_id: job.id.clone(),
        job_number: job.job_number.clone(),
        employee_id,
        start_date: entry.start_date,
        end_date: entry.end_date,
        activity_date: entry.start_date.date(),
        billing_unit: entry.billing_unit,
        duration: valuation.duration,
        quantity: entry.quantity,
        rate_used: entry.rate_used,
        total_cost: valuation.total_cost,
        total_billable,
        dsp_earnings,
    })
}

/// Values every rental entry in the ledger.
///
/// Rentals whose job or rental item does not resolve, and rentals that fail
/// validation, are excluded and reported.
pub fn valuate_rentals(
    ledger: &LedgerSnapshot,
    rules: &BusinessRules,
) -> Valuated<ValuatedRentalEntry> {
    let index = ledger.index();

    let mut valuated = Valuated::default();
    for entry in &ledger.rental_entries {
        let outcome = valuate_one(entry, &index, rules);
        match &outcome {
            Err(ExclusionReason::Invalid(message)) => {
                warn!(entry_id = %entry.id, error = %message, "Excluding invalid rental")
            }
            Err(reason) => debug!(entry_id = %entry.id, reason = ?reason, "Excluding unresolved rental"),
            Ok(_) => {}
        }
        valuated.push(&entry.id, outcome);
    }

    debug!(
        valuated = valuated.entries.len(),
        excluded = valuated.exclusions.len(),
        "Rental valuation complete"
    );
    valuated
}

fn summarize_rentals<F>(rentals: &[ValuatedRentalEntry], key_and_label: F) -> Vec<RentalSummary>
where
    F: Fn(&ValuatedRentalEntry) -> (&str, &str),
{
    let buckets = rentals.iter().fold(
        BTreeMap::<String, RentalSummary>::new(),
        |mut acc, rental| {
            let (key, label) = key_and_label(rental);
            let summary = acc.entry(key.to_string()).or_insert_with(|| RentalSummary {
                key: key.to_string(),
                label: label.to_string(),
                total_quantity: Decimal::ZERO,
                total_duration: Decimal::ZERO,
                total_cost: Decimal::ZERO,
                total_billable: Decimal::ZERO,
                total_dsp_earnings: Decimal::ZERO,
                entries: Vec::new(),
            });
            summary.total_quantity += rental.quantity;
            summary.total_duration += rental.duration;
            summary.total_cost += rental.total_cost;
            summary.total_billable += rental.total_billable;
            summary.total_dsp_earnings += rental.dsp_earnings;
            summary.entries.push(rental.clone());
            acc
        },
    );
    buckets.into_values().collect()
}

/// Groups rentals by job; the label is the job number.
pub fn summarize_rentals_by_job(rentals: &[ValuatedRentalEntry]) -> Vec<RentalSummary> {
    summarize_rentals(rentals, |r| (r.job_id.as_str(), r.job_number.as_str()))
}

/// Groups rentals by rental item; the label is the item name.
pub fn summarize_rentals_by_item(rentals: &[ValuatedRentalEntry]) -> Vec<RentalSummary> {
    summarize_rentals(rentals, |r| (r.rental_item_id.as_str(), r.item_name.as_str()))
}

/// Sums DSP earnings per attributed employee id.
pub fn dsp_earnings_by_employee(rentals: &[ValuatedRentalEntry]) -> BTreeMap<String, Decimal> {
    rentals
        .iter()
        .filter_map(|r| r.employee_id.as_ref().map(|id| (id, r.dsp_earnings)))
        .fold(BTreeMap::new(), |mut acc, (id, earnings)| {
            *acc.entry(id.clone()).or_insert(Decimal::ZERO) += earnings;
            acc
        })
}
