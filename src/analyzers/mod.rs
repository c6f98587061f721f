//! Cross-city and cross-hour summaries of the staged dataset.
//!
//! This module computes headline KPIs, per-city means, the city × risk-level
//! contingency table and the pollutant trend projection, and writes each as
//! a CSV report.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
