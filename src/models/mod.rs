//! Core data models for the billing engine.
//!
//! Entities are supplied by the storage layer; summaries are derived from
//! them on every read.

mod employee;
mod job;
mod ledger;
mod reference;
mod rental;
mod report;
mod summary;
mod time_entry;

pub use employee::{Employee, EmployeeCategory};
pub use job::Job;
pub use ledger::{LedgerIndex, LedgerSnapshot};
pub use reference::{HourType, Province};
pub use rental::{BillingUnit, RentalEntry, RentalItem};
pub use report::{AuditStep, ENGINE_VERSION, Report};
pub use summary::{
    CostSummaryByEmployee, CostSummaryByJob, DailyEmployeeSummary, EmployeeHierarchySummary,
    JobDateInfo, JobInvoiceStats, RentalSummary, RollupTotals, TimeEntrySummary, TitleJobSummary,
    ValuatedRentalEntry, ValuatedTimeEntry, percentage,
};
pub use time_entry::TimeEntry;
