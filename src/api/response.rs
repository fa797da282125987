//! Response types for the billing engine API.
//!
//! This module defines the JSON bodies returned by each endpoint, the error
//! response structures and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::calculation::{Bucket, BulkInvoiceOutcome, Exclusion, GroupBy, RollupKey};
use crate::error::EngineError;
use crate::models::{
    CostSummaryByEmployee, CostSummaryByJob, EmployeeHierarchySummary, Job, JobDateInfo,
    JobInvoiceStats, RentalSummary, RollupTotals, TimeEntrySummary,
};

use super::request::InvoiceAction;

/// Body of `POST /summaries/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSummariesResponse {
    /// One summary per employee with labor, highest cost first.
    pub summaries: Vec<CostSummaryByEmployee>,
    /// Totals across every valuated entry.
    pub grand_totals: RollupTotals,
    /// Time entries left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /summaries/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummariesResponse {
    /// One summary per job with labor, highest cost first.
    pub summaries: Vec<CostSummaryByJob>,
    /// Totals across every valuated entry.
    pub grand_totals: RollupTotals,
    /// Time entries left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /summaries/time-entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntrySummariesResponse {
    /// One summary per employee, job, hour type and province.
    pub summaries: Vec<TimeEntrySummary>,
    /// Totals across every valuated entry.
    pub grand_totals: RollupTotals,
    /// Time entries left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /summaries/rollup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupResponse {
    /// The dimension the buckets were grouped by.
    pub group_by: GroupBy,
    /// Buckets in key order.
    pub buckets: Vec<Bucket<RollupKey>>,
    /// Totals across every valuated entry.
    pub grand_totals: RollupTotals,
    /// Time entries left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /summaries/hierarchy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyResponse {
    /// Root managers with their flattened subordinates.
    pub roots: Vec<EmployeeHierarchySummary>,
    /// Time entries and rentals left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /summaries/rentals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalSummariesResponse {
    /// Rentals grouped by job.
    pub by_job: Vec<RentalSummary>,
    /// Rentals grouped by rental item.
    pub by_item: Vec<RentalSummary>,
    /// Rentals left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

/// Body of `POST /jobs/:job_id/dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDatesResponse {
    /// The job the dates belong to.
    pub job_id: String,
    /// One row per activity date, oldest first.
    pub dates: Vec<JobDateInfo>,
    /// Invoiced vs. uninvoiced split of `dates`.
    pub stats: JobInvoiceStats,
}

/// Body of `POST /jobs/:job_id/invoice-range`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRangeResponse {
    /// The job after the transition.
    pub job: Job,
    /// Which dates moved, if any.
    pub outcome: BulkInvoiceOutcome,
}

/// Body of `POST /jobs/:job_id/invoiced-dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicedDatesResponse {
    /// The job after the transition.
    pub job: Job,
    /// The transition that was applied.
    pub action: InvoiceAction,
    /// Number of dates that changed state.
    pub affected: usize,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a job not found error response.
    pub fn job_not_found(job_id: &str) -> Self {
        Self::with_details(
            "JOB_NOT_FOUND",
            format!("Job not found: {}", job_id),
            format!("No job with id '{}' exists in the submitted ledger", job_id),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidConfig { field, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid configuration",
                    format!("{}: {}", field, message),
                ),
            },
            EngineError::JobNotFound { job_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::job_not_found(&job_id),
            },
            EngineError::InvalidEntry { entry_id, message } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "INVALID_ENTRY",
                    format!("Invalid entry '{}': {}", entry_id, message),
                    "The time entry contains values that cannot be valuated",
                ))
            }
            EngineError::InvalidRental { entry_id, message } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "INVALID_RENTAL",
                    format!("Invalid rental '{}': {}", entry_id, message),
                    "The rental entry contains values that cannot be valuated",
                ))
            }
            EngineError::InvalidDateRange { start, end } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "INVALID_DATE_RANGE",
                    format!("Invalid date range: {} is after {}", start, end),
                    "start_date must be on or before end_date",
                ))
            }
            EngineError::DateRangeTooLong {
                start,
                end,
                days,
                max_days,
            } => ApiErrorResponse::bad_request(ApiError::with_details(
                "DATE_RANGE_TOO_LONG",
                format!("Date range {} to {} spans {} days", start, end, days),
                format!("A bulk range may cover at most {} days", max_days),
            )),
        }
    }
}
