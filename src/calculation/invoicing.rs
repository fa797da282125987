//! Invoice state overlay.
//!
//! Invoicing is tracked per job and calendar date. A date moves between
//! uninvoiced and invoiced only through the explicit transitions in this
//! module, and every transition is idempotent.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BusinessRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Job, JobDateInfo, JobInvoiceStats, LedgerSnapshot, ValuatedRentalEntry, ValuatedTimeEntry,
    percentage,
};

use super::entry_valuation::valuate_time_entries;
use super::rental_valuation::valuate_rentals;

/// The result of a bulk range transition.
///
/// `Unchanged` is a successful outcome: every date in the range was already
/// in the requested state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkInvoiceOutcome {
    /// These dates changed state, in ascending order.
    Changed {
        /// The dates that moved.
        dates: Vec<NaiveDate>,
    },
    /// No date in the range changed state.
    Unchanged,
}

impl BulkInvoiceOutcome {
    fn from_dates(dates: Vec<NaiveDate>) -> Self {
        if dates.is_empty() {
            BulkInvoiceOutcome::Unchanged
        } else {
            BulkInvoiceOutcome::Changed { dates }
        }
    }

    /// Number of dates that changed state.
    pub fn affected_count(&self) -> usize {
        match self {
            BulkInvoiceOutcome::Changed { dates } => dates.len(),
            BulkInvoiceOutcome::Unchanged => 0,
        }
    }
}

/// Longest range, in days, that a bulk transition will expand.
pub const MAX_INVOICE_RANGE_DAYS: i64 = 3_660;

/// Every calendar date from `start` to `end`, inclusive.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDateRange`] if `start` is after `end`, or
/// [`EngineError::DateRangeTooLong`] if the range covers more than
/// [`MAX_INVOICE_RANGE_DAYS`] days.
///
/// ```
/// use billing_engine::calculation::dates_in_range;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(dates_in_range(start, end).unwrap().len(), 3);
/// assert!(dates_in_range(end, start).is_err());
/// ```
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> EngineResult<Vec<NaiveDate>> {
    if start > end {
        return Err(EngineError::InvalidDateRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_INVOICE_RANGE_DAYS {
        return Err(EngineError::DateRangeTooLong {
            start,
            end,
            days,
            max_days: MAX_INVOICE_RANGE_DAYS,
        });
    }
    Ok(std::iter::successors(Some(start), |date| date.succ_opt())
        .take_while(|date| *date <= end)
        .collect())
}

fn job_in<'a>(ledger: &'a mut LedgerSnapshot, job_id: &str) -> EngineResult<&'a mut Job> {
    ledger.job_mut(job_id).ok_or_else(|| EngineError::JobNotFound {
        job_id: job_id.to_string(),
    })
}

/// Marks dates as invoiced on a job and returns how many were new.
///
/// # Errors
///
/// Returns [`EngineError::JobNotFound`] if the job is not in the ledger.
pub fn add_invoiced_dates<I>(ledger: &mut LedgerSnapshot, job_id: &str, dates: I) -> EngineResult<usize>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let added = job_in(ledger, job_id)?.mark_invoiced(dates);
    debug!(job_id = %job_id, added = added.len(), "Invoiced dates added");
    Ok(added.len())
}

/// Clears invoiced dates on a job and returns how many were removed.
///
/// # Errors
///
/// Returns [`EngineError::JobNotFound`] if the job is not in the ledger.
pub fn remove_invoiced_dates<I>(
    ledger: &mut LedgerSnapshot,
    job_id: &str,
    dates: I,
) -> EngineResult<usize>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let removed = job_in(ledger, job_id)?.mark_uninvoiced(dates);
    debug!(job_id = %job_id, removed = removed.len(), "Invoiced dates removed");
    Ok(removed.len())
}

/// Invoices every date from `start` to `end`, inclusive.
///
/// Dates already invoiced are left alone and are not reported.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDateRange`] if `start` is after `end`,
/// [`EngineError::DateRangeTooLong`] if the range exceeds
/// [`MAX_INVOICE_RANGE_DAYS`], or [`EngineError::JobNotFound`] if the job is
/// not in the ledger. The ledger is unchanged on error.
pub fn bulk_range_invoice(
    ledger: &mut LedgerSnapshot,
    job_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> EngineResult<BulkInvoiceOutcome> {
    let dates = dates_in_range(start, end)?;
    let added = job_in(ledger, job_id)?.mark_invoiced(dates);
    debug!(job_id = %job_id, %start, %end, added = added.len(), "Bulk range invoice");
    Ok(BulkInvoiceOutcome::from_dates(added))
}

/// Clears invoicing on every date from `start` to `end`, inclusive.
///
/// # Errors
///
/// Same as [`bulk_range_invoice`].
pub fn bulk_range_uninvoice(
    ledger: &mut LedgerSnapshot,
    job_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> EngineResult<BulkInvoiceOutcome> {
    let dates = dates_in_range(start, end)?;
    let removed = job_in(ledger, job_id)?.mark_uninvoiced(dates);
    debug!(job_id = %job_id, %start, %end, removed = removed.len(), "Bulk range uninvoice");
    Ok(BulkInvoiceOutcome::from_dates(removed))
}

fn empty_date(date: NaiveDate, job: &Job) -> JobDateInfo {
    JobDateInfo {
        date,
        total_hours: Decimal::ZERO,
        effective_hours: Decimal::ZERO,
        loa_count: 0,
        labor_cost: Decimal::ZERO,
        labor_billable: Decimal::ZERO,
        rental_cost: Decimal::ZERO,
        rental_billable: Decimal::ZERO,
        total_billable: Decimal::ZERO,
        is_invoiced: job.is_invoiced(date),
        time_entry_count: 0,
        rental_count: 0,
    }
}

/// Buckets a job's labor and rentals by activity date.
///
/// Entries for other jobs are ignored. Rentals count on the calendar date
/// they start. The result is ordered by date.
pub fn job_dates(
    job: &Job,
    entries: &[ValuatedTimeEntry],
    rentals: &[ValuatedRentalEntry],
) -> Vec<JobDateInfo> {
    let mut by_date: BTreeMap<NaiveDate, JobDateInfo> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.job_id == job.id) {
        let info = by_date
            .entry(entry.date)
            .or_insert_with(|| empty_date(entry.date, job));
        info.total_hours += entry.hours;
        info.effective_hours += entry.effective_hours;
        info.loa_count += u64::from(entry.loa_count);
        info.labor_cost += entry.total_cost;
        info.labor_billable += entry.total_billable;
        info.time_entry_count += 1;
    }

    for rental in rentals.iter().filter(|r| r.job_id == job.id) {
        let info = by_date
            .entry(rental.activity_date)
            .or_insert_with(|| empty_date(rental.activity_date, job));
        info.rental_cost += rental.total_cost;
        info.rental_billable += rental.total_billable;
        info.rental_count += 1;
    }

    by_date
        .into_values()
        .map(|mut info| {
            // LOA is already inside labor_billable
            info.total_billable = info.labor_billable + info.rental_billable;
            info
        })
        .collect()
}

/// Splits a job's activity dates into invoiced and uninvoiced figures.
pub fn invoice_stats(dates: &[JobDateInfo]) -> JobInvoiceStats {
    let mut stats = dates.iter().fold(JobInvoiceStats::default(), |mut stats, info| {
        if info.is_invoiced {
            stats.invoiced_dates += 1;
            stats.invoiced_hours += info.total_hours;
            stats.invoiced_cost += info.labor_cost;
            stats.invoiced_billable += info.total_billable;
        } else {
            stats.uninvoiced_dates += 1;
            stats.uninvoiced_hours += info.total_hours;
            stats.uninvoiced_cost += info.labor_cost;
            stats.uninvoiced_billable += info.total_billable;
        }
        stats
    });
    stats.total_dates = dates.len();
    stats.percent_invoiced = percentage(
        Decimal::from(stats.invoiced_dates),
        Decimal::from(stats.total_dates),
    );
    stats
}

/// Valuates the ledger and returns the activity dates of one job.
///
/// # Errors
///
/// Returns [`EngineError::JobNotFound`] if the job is not in the ledger.
pub fn job_dates_for(
    ledger: &LedgerSnapshot,
    job_id: &str,
    rules: &BusinessRules,
) -> EngineResult<Vec<JobDateInfo>> {
    let job = ledger
        .jobs
        .iter()
        .find(|job| job.id == job_id)
        .ok_or_else(|| EngineError::JobNotFound {
            job_id: job_id.to_string(),
        })?;

    let entries = valuate_time_entries(ledger, rules);
    let rentals = valuate_rentals(ledger, rules);
    Ok(job_dates(job, &entries.entries, &rentals.entries))
}
