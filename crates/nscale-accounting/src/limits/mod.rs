//! Limits module
//!
//! Splits a Waldur resource's limits into backend (converted) and Waldur
//! (raw) limits over the configured components.

pub mod collector;

pub use collector::{CollectedLimits, LimitCollector};
