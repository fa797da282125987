//! HTTP API module for the billing engine.
//!
//! This module provides the REST endpoints for cost summaries, the manager
//! hierarchy, rental summaries and per-job invoicing state.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{InvoiceAction, InvoiceDatesRequest, InvoiceRangeRequest, RollupParams};
pub use response::{
    ApiError, ApiErrorResponse, EmployeeSummariesResponse, HierarchyResponse,
    InvoiceRangeResponse, InvoicedDatesResponse, JobDatesResponse, JobSummariesResponse,
    RentalSummariesResponse, RollupResponse, TimeEntrySummariesResponse,
};
pub use state::AppState;
