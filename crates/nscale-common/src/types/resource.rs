//! Compute resource documents
//!
//! Instances, clusters and networks are exchanged with the compute API as
//! `metadata` / `spec` / `status` documents. Quantities in a spec are in the
//! backend's units, i.e. already multiplied by the component unit factor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource limits as sent by Waldur, keyed by component name
pub type ResourceLimits = BTreeMap<String, f64>;

/// Identity of a backend resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ResourceMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Network attachment of an instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
}

/// Requested shape of an instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    /// Flavor (instance type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// CPU cores, backend units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Decimal>,
    /// Memory, backend units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Decimal>,
    /// Storage, backend units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,
}

/// Observed state of an instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    #[serde(default)]
    pub power_state: Option<String>,
    #[serde(default)]
    pub provisioning_status: Option<String>,
}

/// Compute instance document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: InstanceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InstanceStatus>,
}

impl Instance {
    /// Quantity reported by the backend for a component, if it has a field for it
    pub fn quantity(&self, component: &crate::ComponentType) -> Option<Decimal> {
        use crate::ComponentType;

        match component {
            ComponentType::Cpu => self.spec.cpu,
            ComponentType::Memory => self.spec.memory,
            ComponentType::Storage => self.spec.storage,
            _ => None,
        }
    }

    /// Set the spec field for a component; returns false if the spec has none
    pub fn set_quantity(&mut self, component: &crate::ComponentType, value: Decimal) -> bool {
        use crate::ComponentType;

        let slot = match component {
            ComponentType::Cpu => &mut self.spec.cpu,
            ComponentType::Memory => &mut self.spec.memory,
            ComponentType::Storage => &mut self.spec.storage,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Group of identical nodes in a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadPool {
    pub name: String,
    pub replicas: u32,
    pub flavor_id: String,
}

/// Requested shape of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub workload_pools: Vec<WorkloadPool>,
}

/// Observed state of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(default)]
    pub provisioning_status: Option<String>,
}

/// Compute cluster document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: ClusterSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
}

/// Network document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub metadata: ResourceMetadata,
}

/// Backend resource as seen by the host agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientResource {
    /// Backend ID, or name when the backend has not assigned one
    pub name: String,
    /// Display name
    pub description: String,
    /// Owning project
    pub organization: String,
    pub backend_id: String,
}

impl ClientResource {
    /// Describe a backend resource owned by `organization`
    pub fn from_metadata(metadata: &ResourceMetadata, organization: &str) -> Self {
        let name = if metadata.id.is_empty() {
            metadata.name.clone()
        } else {
            metadata.id.clone()
        };

        Self {
            name,
            description: metadata.name.clone(),
            organization: organization.to_string(),
            backend_id: metadata.id.clone(),
        }
    }
}
