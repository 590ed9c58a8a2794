//! # Nscale Accounting
//!
//! Translates Waldur quantities into Nscale quantities and back.
//!
//! ## Conversion Formula
//!
//! ```text
//! backend = waldur × unit_factor
//! waldur  = backend ÷ unit_factor
//! ```
//!
//! Where `unit_factor` is configured per component (e.g. `1024` for GB → MB,
//! `1/1024` for MB → GB, `1` for pass-through core counts). All arithmetic is
//! exact decimal arithmetic.

pub mod conversion;
pub mod limits;
pub mod usage;

pub use conversion::{ComponentTable, UnitConverter};
pub use limits::{CollectedLimits, LimitCollector};
pub use usage::{ComponentUsage, UsageReport, UsageReporter};
