//! Cost, billing and invoicing engine for time-and-materials tracking
//!
//! This crate turns a snapshot of time entries, rentals and their reference
//! data into cost and billable figures, rolls them up by employee, job, title,
//! date and manager hierarchy, and tracks which job dates have been invoiced.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
