//! # Nscale Common
//!
//! Shared types and errors for the Nscale backend of Waldur Site Agent.
//!
//! ## Core Types
//!
//! - [`ComponentSpec`]: a billable dimension (cpu, memory, storage, ...) with its unit factor
//! - [`UnitFactor`]: strictly positive decimal ratio between Waldur and backend units
//! - [`BackendSettings`]: validated connection and default settings
//! - [`Instance`]/[`Cluster`]/[`Network`]: documents exchanged with the compute API
//!
//! ## Errors
//!
//! - [`ConversionError`]: unit conversion failures
//! - [`ConfigError`]: settings and component validation failures
//! - [`ApiError`]: compute API port failures
//! - [`BackendError`]: backend operation failures

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ApiError, BackendError, ConfigError, ConversionError, NscaleError, Result};
pub use types::{
    component::{AccountingType, ComponentConfig, ComponentSpec, ComponentType, UnitFactor},
    resource::{
        ClientResource, Cluster, ClusterSpec, ClusterStatus, Instance, InstanceSpec,
        InstanceStatus, Network, Networking, ResourceLimits, ResourceMetadata, WorkloadPool,
    },
    settings::{BackendSettings, RawBackendSettings, ResourceType, ServiceToken},
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend type identifier reported to the host agent
pub const BACKEND_TYPE: &str = "nscale";

/// Default prefix for resource names
pub const DEFAULT_RESOURCE_PREFIX: &str = "waldur_";

/// Default instance type (flavor) for compute resources
pub const DEFAULT_INSTANCE_TYPE: &str = "standard";

/// Usage report key for account-wide totals
pub const TOTAL_ACCOUNT_USAGE: &str = "TOTAL_ACCOUNT_USAGE";
