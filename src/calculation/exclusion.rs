//! Exclusion records for entries left out of a valuation pass.

use serde::{Deserialize, Serialize};

/// Why an entry was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The employee id did not resolve.
    UnknownEmployee(String),
    /// The job id did not resolve.
    UnknownJob(String),
    /// The hour type id did not resolve.
    UnknownHourType(String),
    /// The province id did not resolve.
    UnknownProvince(String),
    /// The rental item id did not resolve.
    UnknownRentalItem(String),
    /// The entry resolved but its values could not be valuated.
    Invalid(String),
}

/// An entry that a valuation pass skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// The id of the skipped entry.
    pub entry_id: String,
    /// Why it was skipped.
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

/// The output of a valuation pass: what was valued and what was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuated<T> {
    /// Successfully valuated entries, in input order.
    pub entries: Vec<T>,
    /// Entries left out of aggregation.
    pub exclusions: Vec<Exclusion>,
}

impl<T> Default for Valuated<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            exclusions: Vec::new(),
        }
    }
}

impl<T> Valuated<T> {
    pub(crate) fn push(&mut self, entry_id: &str, outcome: Result<T, ExclusionReason>) {
        match outcome {
            Ok(entry) => self.entries.push(entry),
            Err(reason) => self.exclusions.push(Exclusion {
                entry_id: entry_id.to_string(),
                reason,
            }),
        }
    }
}
