//! Rollup aggregation over valuated time entries.
//!
//! Every rollup is a single pass that folds entries into buckets keyed by an
//! ordered key, so output order is deterministic for identical input. Each
//! bucket keeps its source entries for drill-down.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    CostSummaryByEmployee, CostSummaryByJob, DailyEmployeeSummary, EmployeeHierarchySummary,
    RollupTotals, TimeEntrySummary, TitleJobSummary, ValuatedTimeEntry,
};

/// An accumulator that valuated entries can be folded into.
pub trait Absorb {
    /// Folds one entry into the accumulator.
    fn absorb(&mut self, entry: &ValuatedTimeEntry);
}

/// Anything that carries rollup totals.
pub trait Summarized {
    /// The bucket's summed figures.
    fn totals(&self) -> &RollupTotals;
}

/// A generic rollup bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<K> {
    /// The grouping key shared by every entry in the bucket.
    pub key: K,
    /// Summed figures.
    pub totals: RollupTotals,
    /// Source entries, in input order.
    pub entries: Vec<ValuatedTimeEntry>,
}

impl<K> Bucket<K> {
    /// Creates an empty bucket for `key`.
    pub fn new(key: K) -> Self {
        Self {
            key,
            totals: RollupTotals::default(),
            entries: Vec::new(),
        }
    }
}

impl<K> Absorb for Bucket<K> {
    fn absorb(&mut self, entry: &ValuatedTimeEntry) {
        self.totals.add(entry);
        self.entries.push(entry.clone());
    }
}

impl<K> Summarized for Bucket<K> {
    fn totals(&self) -> &RollupTotals {
        &self.totals
    }
}

/// Folds entries into one accumulator per distinct key.
///
/// `seed` builds the accumulator from the key and the first entry seen for
/// it; every entry, including the first, is then absorbed. Buckets are
/// returned in key order.
pub fn fold_by<K, A, KF, SF>(entries: &[ValuatedTimeEntry], key_fn: KF, seed: SF) -> Vec<A>
where
    K: Ord,
    A: Absorb,
    KF: Fn(&ValuatedTimeEntry) -> K,
    SF: Fn(&K, &ValuatedTimeEntry) -> A,
{
    let mut buckets: BTreeMap<K, A> = BTreeMap::new();
    for entry in entries {
        let bucket = match buckets.entry(key_fn(entry)) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let seeded = seed(vacant.key(), entry);
                vacant.insert(seeded)
            }
        };
        bucket.absorb(entry);
    }
    buckets.into_values().collect()
}

/// Dimensions a rollup can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One bucket per employee.
    Employee,
    /// One bucket per job.
    Job,
    /// One bucket per employee title and job.
    TitleAndJob,
    /// One bucket per date and employee name.
    DateAndEmployee,
    /// One bucket per employee, job, hour type and province.
    EntryDetail,
}

/// A concrete grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "group_by", rename_all = "snake_case")]
pub enum RollupKey {
    /// Grouped by employee.
    Employee {
        /// Employee id.
        employee_id: String,
    },
    /// Grouped by job.
    Job {
        /// Job id.
        job_id: String,
    },
    /// Grouped by employee title and job.
    TitleAndJob {
        /// Employee title.
        title: String,
        /// Job id.
        job_id: String,
    },
    /// Grouped by date and employee name.
    DateAndEmployee {
        /// Date worked.
        date: NaiveDate,
        /// Employee display name.
        employee_name: String,
    },
    /// Grouped by employee, job, hour type and province.
    EntryDetail {
        /// Employee id.
        employee_id: String,
        /// Job id.
        job_id: String,
        /// Hour type id.
        hour_type_id: String,
        /// Province id.
        province_id: String,
    },
}

impl RollupKey {
    /// Builds the key for `entry` under a grouping.
    pub fn for_entry(group_by: GroupBy, entry: &ValuatedTimeEntry) -> Self {
        match group_by {
            GroupBy::Employee => RollupKey::Employee {
                employee_id: entry.employee_id.clone(),
            },
            GroupBy::Job => RollupKey::Job {
                job_id: entry.job_id.clone(),
            },
            GroupBy::TitleAndJob => RollupKey::TitleAndJob {
                title: entry.employee_title.clone(),
                job_id: entry.job_id.clone(),
            },
            GroupBy::DateAndEmployee => RollupKey::DateAndEmployee {
                date: entry.date,
                employee_name: entry.employee_name.clone(),
            },
            GroupBy::EntryDetail => RollupKey::EntryDetail {
                employee_id: entry.employee_id.clone(),
                job_id: entry.job_id.clone(),
                hour_type_id: entry.hour_type_id.clone(),
                province_id: entry.province_id.clone(),
            },
        }
    }
}

/// Groups entries into generic buckets along one dimension.
///
/// # Examples
///
/// ```
/// use billing_engine::calculation::{rollup, GroupBy};
///
/// let buckets = rollup(&[], GroupBy::Employee);
/// assert!(buckets.is_empty());
/// ```
pub fn rollup(entries: &[ValuatedTimeEntry], group_by: GroupBy) -> Vec<Bucket<RollupKey>> {
    fold_by(
        entries,
        |entry| RollupKey::for_entry(group_by, entry),
        |key: &RollupKey, _| Bucket::new(key.clone()),
    )
}

/// Sums every entry into one set of totals.
pub fn grand_totals(entries: &[ValuatedTimeEntry]) -> RollupTotals {
    entries.iter().fold(RollupTotals::default(), |mut totals, entry| {
        totals.add(entry);
        totals
    })
}

macro_rules! summary_impls {
    ($($summary:ty),+ $(,)?) => {
        $(
            impl Absorb for $summary {
                fn absorb(&mut self, entry: &ValuatedTimeEntry) {
                    self.totals.add(entry);
                    self.entries.push(entry.clone());
                }
            }

            impl Summarized for $summary {
                fn totals(&self) -> &RollupTotals {
                    &self.totals
                }
            }
        )+
    };
}

summary_impls!(
    TimeEntrySummary,
    CostSummaryByEmployee,
    TitleJobSummary,
    DailyEmployeeSummary,
);

impl Absorb for CostSummaryByJob {
    fn absorb(&mut self, entry: &ValuatedTimeEntry) {
        self.totals.add(entry);
        self.employee_breakdown
            .entry(entry.employee_name.clone())
            .or_default()
            .add(entry);
        self.entries.push(entry.clone());
    }
}

impl Summarized for CostSummaryByJob {
    fn totals(&self) -> &RollupTotals {
        &self.totals
    }
}

impl Summarized for EmployeeHierarchySummary {
    fn totals(&self) -> &RollupTotals {
        &self.totals
    }
}

/// Rolls entries up per employee.
pub fn summarize_by_employee(entries: &[ValuatedTimeEntry]) -> Vec<CostSummaryByEmployee> {
    fold_by(
        entries,
        |entry| entry.employee_id.clone(),
        |employee_id: &String, first| CostSummaryByEmployee {
            employee_id: employee_id.clone(),
            employee_name: first.employee_name.clone(),
            title: first.employee_title.clone(),
            category: first.employee_category.clone(),
            totals: RollupTotals::default(),
            entries: Vec::new(),
        },
    )
}

/// Rolls entries up per job, with a per-employee breakdown inside each job.
pub fn summarize_by_job(entries: &[ValuatedTimeEntry]) -> Vec<CostSummaryByJob> {
    fold_by(
        entries,
        |entry| entry.job_id.clone(),
        |job_id: &String, first| CostSummaryByJob {
            job_id: job_id.clone(),
            job_number: first.job_number.clone(),
            job_name: first.job_name.clone(),
            totals: RollupTotals::default(),
            employee_breakdown: BTreeMap::new(),
            entries: Vec::new(),
        },
    )
}

/// Rolls entries up per employee title and job.
pub fn summarize_by_title_and_job(entries: &[ValuatedTimeEntry]) -> Vec<TitleJobSummary> {
    fold_by(
        entries,
        |entry| (entry.employee_title.clone(), entry.job_id.clone()),
        |key: &(String, String), first| TitleJobSummary {
            title: key.0.clone(),
            job_id: key.1.clone(),
            job_number: first.job_number.clone(),
            totals: RollupTotals::default(),
            entries: Vec::new(),
        },
    )
}

/// Rolls entries up per date and employee name.
pub fn summarize_by_date_and_employee(entries: &[ValuatedTimeEntry]) -> Vec<DailyEmployeeSummary> {
    fold_by(
        entries,
        |entry| (entry.date, entry.employee_name.clone()),
        |key: &(NaiveDate, String), _| DailyEmployeeSummary {
            date: key.0,
            employee_name: key.1.clone(),
            totals: RollupTotals::default(),
            entries: Vec::new(),
        },
    )
}

/// Rolls entries up per employee, job, hour type and province.
pub fn summarize_time_entries(entries: &[ValuatedTimeEntry]) -> Vec<TimeEntrySummary> {
    fold_by(
        entries,
        |entry| {
            (
                entry.employee_id.clone(),
                entry.job_id.clone(),
                entry.hour_type_id.clone(),
                entry.province_id.clone(),
            )
        },
        |_, first| TimeEntrySummary {
            employee_id: first.employee_id.clone(),
            employee_name: first.employee_name.clone(),
            job_id: first.job_id.clone(),
            job_number: first.job_number.clone(),
            hour_type_id: first.hour_type_id.clone(),
            hour_type_name: first.hour_type_name.clone(),
            province_id: first.province_id.clone(),
            province_name: first.province_name.clone(),
            totals: RollupTotals::default(),
            entries: Vec::new(),
        },
    )
}

/// Sorts summaries by cost, highest first. Ties keep their order.
pub fn sort_by_cost_desc<T: Summarized>(items: &mut [T]) {
    items.sort_by(|a, b| b.totals().cost.cmp(&a.totals().cost));
}

/// Sorts summaries by billable, highest first. Ties keep their order.
pub fn sort_by_billable_desc<T: Summarized>(items: &mut [T]) {
    items.sort_by(|a, b| b.totals().billable.cmp(&a.totals().billable));
}

/// Sorts summaries by raw hours, highest first. Ties keep their order.
pub fn sort_by_hours_desc<T: Summarized>(items: &mut [T]) {
    items.sort_by(|a, b| b.totals().hours.cmp(&a.totals().hours));
}
