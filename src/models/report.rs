//! Report envelope and audit step types.
//!
//! Aggregates leaving the engine through the HTTP API are wrapped in a
//! [`Report`] carrying an id, a timestamp and the engine version. Rate and
//! valuation steps record an [`AuditStep`] explaining the arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The version string stamped into every report.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A single step recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// An aggregate together with when and by what it was produced.
///
/// # Example
///
/// ```
/// use billing_engine::models::Report;
///
/// let report = Report::new(vec![1, 2, 3]);
/// assert_eq!(report.data.len(), 3);
/// assert!(!report.engine_version.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report<T> {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that produced the report.
    pub engine_version: String,
    /// The aggregate payload.
    pub data: T,
}

impl<T> Report<T> {
    /// Wraps `data` in a freshly stamped envelope.
    pub fn new(data: T) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            data,
        }
    }
}
