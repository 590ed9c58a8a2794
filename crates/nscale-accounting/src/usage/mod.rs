//! Usage module
//!
//! Maps backend resource documents into per-component Waldur usage.

pub mod report;

pub use report::{ComponentUsage, UsageReport, UsageReporter};
