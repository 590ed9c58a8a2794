//! Conversion module
//!
//! Provides the per-component unit conversion:
//! - ComponentTable: validated component specs, built once at startup
//! - UnitConverter: Waldur ↔ backend quantity conversion

pub mod converter;
pub mod table;

pub use converter::UnitConverter;
pub use table::ComponentTable;
