//! Employee model and related types.
//!
//! This module defines the [`Employee`] struct and the [`EmployeeCategory`]
//! tag that decides whether GST is owed on an employee's cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The engagement category of a worker.
///
/// Anything other than [`EmployeeCategory::Employee`] is treated as an
/// external payee for GST purposes. Unknown categories are preserved
/// verbatim in [`EmployeeCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmployeeCategory {
    /// A regular payroll employee.
    #[default]
    Employee,
    /// A delivery service partner paid as a third party.
    Dsp,
    /// Any other category string.
    Other(String),
}

impl EmployeeCategory {
    /// Returns the category as its wire string.
    pub fn as_str(&self) -> &str {
        match self {
            EmployeeCategory::Employee => "employee",
            EmployeeCategory::Dsp => "dsp",
            EmployeeCategory::Other(value) => value,
        }
    }

    /// Returns true if GST applies to this category's cost.
    ///
    /// ```
    /// use billing_engine::models::EmployeeCategory;
    ///
    /// assert!(!EmployeeCategory::Employee.is_gst_applicable());
    /// assert!(EmployeeCategory::Dsp.is_gst_applicable());
    /// assert!(EmployeeCategory::Other("contractor".to_string()).is_gst_applicable());
    /// ```
    pub fn is_gst_applicable(&self) -> bool {
        !matches!(self, EmployeeCategory::Employee)
    }
}

impl From<String> for EmployeeCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "employee" => EmployeeCategory::Employee,
            "dsp" => EmployeeCategory::Dsp,
            _ => EmployeeCategory::Other(value),
        }
    }
}

impl From<EmployeeCategory> for String {
    fn from(category: EmployeeCategory) -> Self {
        category.as_str().to_string()
    }
}

/// Represents a worker whose time is costed and billed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Job title (e.g., "Foreman").
    pub title: String,
    /// Client-facing hourly rate.
    pub billable_wage: Decimal,
    /// Internal hourly cost rate.
    pub cost_wage: Decimal,
    /// The employee's manager, if this employee is a subordinate.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Engagement category; a missing category means a regular employee.
    #[serde(default)]
    pub category: Option<EmployeeCategory>,
}

impl Employee {
    /// Returns the effective category, defaulting to a regular employee.
    pub fn category(&self) -> EmployeeCategory {
        self.category.clone().unwrap_or_default()
    }

    /// Returns true if the employee has no manager and heads a rollup.
    ///
    /// # Examples
    ///
    /// ```
    /// use billing_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Dana Reyes".to_string(),
    ///     title: "Foreman".to_string(),
    ///     billable_wage: Decimal::new(45, 0),
    ///     cost_wage: Decimal::new(30, 0),
    ///     manager_id: None,
    ///     category: None,
    /// };
    /// assert!(employee.is_root());
    /// ```
    pub fn is_root(&self) -> bool {
        self.manager_id.is_none()
    }
}
