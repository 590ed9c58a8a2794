//! Compute API port
//!
//! The calls the backend makes against Nscale, scoped to the configured
//! organization and project. Transport is left to implementations.

use async_trait::async_trait;
use nscale_common::{ApiError, Cluster, Instance, InstanceSpec, Network};

/// Trait for compute API clients
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// List networks in the project
    async fn list_networks(&self) -> Result<Vec<Network>, ApiError>;

    /// Get a network by ID
    async fn get_network(&self, network_id: &str) -> Result<Network, ApiError>;

    /// List compute instances in the project
    async fn list_instances(&self) -> Result<Vec<Instance>, ApiError>;

    /// Get an instance by ID
    async fn get_instance(&self, instance_id: &str) -> Result<Instance, ApiError>;

    /// Create an instance from a draft document
    async fn create_instance(&self, instance: Instance) -> Result<Instance, ApiError>;

    /// Merge the set fields of `spec` into an instance's spec
    async fn update_instance(
        &self,
        instance_id: &str,
        spec: InstanceSpec,
    ) -> Result<Instance, ApiError>;

    /// Power on an instance
    async fn start_instance(&self, instance_id: &str) -> Result<(), ApiError>;

    /// Power off an instance
    async fn stop_instance(&self, instance_id: &str) -> Result<(), ApiError>;

    /// Delete an instance
    async fn delete_instance(&self, instance_id: &str) -> Result<(), ApiError>;

    /// List compute clusters in the project
    async fn list_clusters(&self) -> Result<Vec<Cluster>, ApiError>;

    /// Create a cluster from a draft document
    async fn create_cluster(&self, cluster: Cluster) -> Result<Cluster, ApiError>;

    /// Delete a cluster
    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), ApiError>;
}
