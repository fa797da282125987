//! Job model.
//!
//! A job is the billing target for labor and rentals. Invoicing state is held
//! on the job as a set of calendar dates.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents a job that time and rentals are charged against.
///
/// # Example
///
/// ```
/// use billing_engine::models::Job;
/// use chrono::NaiveDate;
/// use std::collections::BTreeSet;
///
/// let job = Job {
///     id: "job_001".to_string(),
///     job_number: "J-1001".to_string(),
///     name: "Pipeline Tie-In".to_string(),
///     is_active: true,
///     is_billable: true,
///     invoiced_dates: BTreeSet::from([NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()]),
/// };
/// assert!(job.is_invoiced(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
/// assert!(!job.is_invoiced(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier for the job.
    pub id: String,
    /// External billing key; unique across jobs.
    pub job_number: String,
    /// Human-readable job name.
    pub name: String,
    /// Whether the job is still open for new entries.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Non-billable jobs are cost sinks and earn no revenue.
    #[serde(default = "default_true")]
    pub is_billable: bool,
    /// Calendar dates that have been invoiced for this job.
    #[serde(default)]
    pub invoiced_dates: BTreeSet<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Job {
    /// Returns true if the given date has been invoiced.
    pub fn is_invoiced(&self, date: NaiveDate) -> bool {
        self.invoiced_dates.contains(&date)
    }

    /// Adds dates to the invoiced set and returns the dates that were new.
    ///
    /// Dates already invoiced are left alone, so repeating a call is a no-op.
    pub fn mark_invoiced<I>(&mut self, dates: I) -> Vec<NaiveDate>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut added: Vec<NaiveDate> = dates
            .into_iter()
            .filter(|date| self.invoiced_dates.insert(*date))
            .collect();
        added.sort();
        added
    }

    /// Removes dates from the invoiced set and returns the dates that were removed.
    pub fn mark_uninvoiced<I>(&mut self, dates: I) -> Vec<NaiveDate>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut removed: Vec<NaiveDate> = dates
            .into_iter()
            .filter(|date| self.invoiced_dates.remove(date))
            .collect();
        removed.sort();
        removed
    }
}
