//! Error types for the billing engine.
//!
//! Data-quality problems in a ledger (dangling references, a bad entry) are
//! not errors at the aggregation level: they are recorded as exclusions. The
//! variants here cover configuration failures, explicit invoice operations on
//! missing jobs or bad ranges, and single-entry valuation.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the billing engine.
///
/// # Example
///
/// ```
/// use billing_engine::error::EngineError;
///
/// let error = EngineError::JobNotFound {
///     job_id: "job_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Job not found: job_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was parsed but is out of range.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An invoice operation referenced a job that is not in the ledger.
    #[error("Job not found: {job_id}")]
    JobNotFound {
        /// The job id that did not resolve.
        job_id: String,
    },

    /// A time entry carries values that cannot be valuated.
    #[error("Invalid entry '{entry_id}': {message}")]
    InvalidEntry {
        /// The ID of the invalid entry.
        entry_id: String,
        /// A description of what made the entry invalid.
        message: String,
    },

    /// A rental entry carries values that cannot be valuated.
    #[error("Invalid rental '{entry_id}': {message}")]
    InvalidRental {
        /// The ID of the invalid rental entry.
        entry_id: String,
        /// A description of what made the rental invalid.
        message: String,
    },

    /// A date range whose start falls after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// First date of the range.
        start: NaiveDate,
        /// Last date of the range.
        end: NaiveDate,
    },

    /// A date range that spans more days than a bulk transition allows.
    #[error("Date range {start} to {end} spans {days} days; at most {max_days} are allowed")]
    DateRangeTooLong {
        /// First date of the range.
        start: NaiveDate,
        /// Last date of the range.
        end: NaiveDate,
        /// Days in the range, inclusive.
        days: i64,
        /// The configured limit.
        max_days: i64,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
