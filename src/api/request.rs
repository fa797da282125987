//! Request types for the billing engine API.
//!
//! Summary endpoints take a bare [`LedgerSnapshot`]; the invoicing endpoints
//! wrap the snapshot together with the transition to apply.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::GroupBy;
use crate::models::LedgerSnapshot;

/// Direction of an invoicing transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceAction {
    /// Mark dates as invoiced.
    #[default]
    Add,
    /// Clear invoiced dates.
    Remove,
}

/// Query parameters for `POST /summaries/rollup`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollupParams {
    /// The grouping dimension.
    pub group_by: GroupBy,
}

/// Request body for `POST /jobs/:job_id/invoice-range`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRangeRequest {
    /// The ledger holding the job.
    pub ledger: LedgerSnapshot,
    /// First date of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive).
    pub end_date: NaiveDate,
    /// Invoice or uninvoice the range; defaults to invoicing.
    #[serde(default)]
    pub action: InvoiceAction,
}

/// Request body for `POST /jobs/:job_id/invoiced-dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDatesRequest {
    /// The ledger holding the job.
    pub ledger: LedgerSnapshot,
    /// The transition to apply.
    pub action: InvoiceAction,
    /// The dates to transition.
    pub dates: Vec<NaiveDate>,
}
