//! Compute API infrastructure
//!
//! The port the backend talks through, and an in-memory implementation.

pub mod compute_api;
pub mod memory_api;
