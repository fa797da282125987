//! Calculation logic for the billing engine.
//!
//! This module turns a ledger snapshot into money: rate resolution for hour
//! types, time entry and rental valuation, rollups along every reporting
//! dimension, the manager hierarchy with its GST and DSP overlays, and the
//! per-date invoicing overlay for jobs.

mod entry_valuation;
mod exclusion;
mod hierarchy;
mod invoicing;
mod rate_resolver;
mod rental_valuation;
mod rollup;

pub use entry_valuation::{
    LOA_RULE, MAX_ENTRY_AMOUNT, TimeEntryValuation, valuate_time_entries, value_time_entry,
};
pub use exclusion::{Exclusion, ExclusionReason, Valuated};
pub use hierarchy::{ManagerIndex, compose_hierarchy, gst_amount};
pub use invoicing::{
    BulkInvoiceOutcome, MAX_INVOICE_RANGE_DAYS, add_invoiced_dates, bulk_range_invoice,
    bulk_range_uninvoice, dates_in_range, invoice_stats, job_dates, job_dates_for,
    remove_invoiced_dates,
};
pub use rate_resolver::{RATE_RESOLUTION_RULE, RateResolution, resolve_rate};
pub use rental_valuation::{
    RentalValuation, dsp_earnings_by_employee, rental_duration, summarize_rentals_by_item,
    summarize_rentals_by_job, valuate_rentals, value_rental,
};
pub use rollup::{
    Absorb, Bucket, GroupBy, RollupKey, Summarized, fold_by, grand_totals, rollup,
    sort_by_billable_desc, sort_by_cost_desc, sort_by_hours_desc, summarize_by_date_and_employee,
    summarize_by_employee, summarize_by_job, summarize_by_title_and_job, summarize_time_entries,
};
