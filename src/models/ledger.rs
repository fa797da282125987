//! Ledger snapshot and lookup index.
//!
//! A [`LedgerSnapshot`] is the complete entity set the storage layer hands to
//! the engine for one aggregation pass. [`LedgerIndex`] borrows a snapshot and
//! resolves ids to entities in constant time; it is built once per pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Employee, HourType, Job, Province, RentalEntry, RentalItem, TimeEntry};

/// A consistent snapshot of all entities taking part in aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// All employees.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// All jobs.
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// All hour types.
    #[serde(default)]
    pub hour_types: Vec<HourType>,
    /// All provinces.
    #[serde(default)]
    pub provinces: Vec<Province>,
    /// All time entries.
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    /// All rentable items.
    #[serde(default)]
    pub rental_items: Vec<RentalItem>,
    /// All rental entries.
    #[serde(default)]
    pub rental_entries: Vec<RentalEntry>,
}

impl LedgerSnapshot {
    /// Builds a lookup index over this snapshot.
    pub fn index(&self) -> LedgerIndex<'_> {
        LedgerIndex::new(self)
    }

    /// Returns a mutable reference to the job with the given id.
    pub fn job_mut(&mut self, job_id: &str) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == job_id)
    }
}

/// Id-to-entity maps over a borrowed [`LedgerSnapshot`].
///
/// If ids are duplicated in the snapshot, the last occurrence wins.
#[derive(Debug, Clone)]
pub struct LedgerIndex<'a> {
    employees: HashMap<&'a str, &'a Employee>,
    jobs: HashMap<&'a str, &'a Job>,
    hour_types: HashMap<&'a str, &'a HourType>,
    provinces: HashMap<&'a str, &'a Province>,
    rental_items: HashMap<&'a str, &'a RentalItem>,
}

fn by_id<'a, T>(items: &'a [T], id: impl Fn(&'a T) -> &'a str) -> HashMap<&'a str, &'a T> {
    items.iter().map(|item| (id(item), item)).collect()
}

impl<'a> LedgerIndex<'a> {
    /// Indexes every reference table of the snapshot.
    pub fn new(ledger: &'a LedgerSnapshot) -> Self {
        Self {
            employees: by_id(&ledger.employees, |e| e.id.as_str()),
            jobs: by_id(&ledger.jobs, |j| j.id.as_str()),
            hour_types: by_id(&ledger.hour_types, |h| h.id.as_str()),
            provinces: by_id(&ledger.provinces, |p| p.id.as_str()),
            rental_items: by_id(&ledger.rental_items, |r| r.id.as_str()),
        }
    }

    /// Looks up an employee by id.
    pub fn employee(&self, id: &str) -> Option<&'a Employee> {
        self.employees.get(id).copied()
    }

    /// Looks up a job by id.
    pub fn job(&self, id: &str) -> Option<&'a Job> {
        self.jobs.get(id).copied()
    }

    /// Looks up an hour type by id.
    pub fn hour_type(&self, id: &str) -> Option<&'a HourType> {
        self.hour_types.get(id).copied()
    }

    /// Looks up a province by id.
    pub fn province(&self, id: &str) -> Option<&'a Province> {
        self.provinces.get(id).copied()
    }

    /// Looks up a rental item by id.
    pub fn rental_item(&self, id: &str) -> Option<&'a RentalItem> {
        self.rental_items.get(id).copied()
    }
}
