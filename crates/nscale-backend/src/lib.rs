//! # Nscale Backend
//!
//! Waldur Site Agent backend for Nscale compute. Waldur resources map to
//! Nscale compute instances (or clusters), scoped to one organization and
//! project.
//!
//! ## Mapping
//!
//! - Waldur project → Nscale project
//! - Waldur resource → Nscale compute instance or cluster
//! - Waldur limits → instance `cpu`/`memory`/`storage`, scaled by unit factor
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 NscaleBackend                │
//! │  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ LimitCollector│ │    UsageReporter     │  │
//! │  └──────┬───────┘  └──────────┬───────────┘  │
//! │         └────── UnitConverter ┘              │
//! │                      │                       │
//! │  ┌───────────────────┴───────────────────┐   │
//! │  │         ComputeApi (port)             │   │
//! │  └───────────────────────────────────────┘   │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod infra;

// Re-export core types
pub use config::AgentConfig;
pub use domain::backend::{NscaleBackend, ResourceDetails};

// Re-export infrastructure
pub use infra::compute_api::ComputeApi;
pub use infra::memory_api::InMemoryComputeApi;

/// Backend version
pub const BACKEND_VERSION: &str = env!("CARGO_PKG_VERSION");
