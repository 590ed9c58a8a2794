//! Backend domain logic
//!
//! Resource lifecycle, limits and usage for Waldur resources backed by Nscale
//! instances or clusters.

pub mod backend;
pub mod payload;
