//! In-memory compute API
//!
//! Keeps networks, instances and clusters in DashMaps. New resources take
//! their draft name as ID when no ID is given. Can be switched to fail
//! every call, or only creations, to exercise error paths.

use async_trait::async_trait;
use dashmap::DashMap;
use nscale_common::{
    ApiError, Cluster, ClusterStatus, Instance, InstanceSpec, InstanceStatus, Network,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::compute_api::ComputeApi;

const POWER_RUNNING: &str = "running";
const POWER_STOPPED: &str = "stopped";
const PROVISIONED: &str = "provisioned";

/// In-memory compute API implementation
#[derive(Default)]
pub struct InMemoryComputeApi {
    networks: DashMap<String, Network>,
    instances: DashMap<String, Instance>,
    clusters: DashMap<String, Cluster>,

    /// Calls made, by operation name
    calls: DashMap<&'static str, usize>,

    /// Fail every call with a request error
    unavailable: AtomicBool,

    /// Reject creations with this reason
    create_rejection: RwLock<Option<String>>,
}

impl InMemoryComputeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a network
    pub fn with_network(self, network: Network) -> Self {
        self.networks.insert(network.metadata.id.clone(), network);
        self
    }

    /// Seed an instance
    pub fn with_instance(self, instance: Instance) -> Self {
        self.instances.insert(instance.metadata.id.clone(), instance);
        self
    }

    /// Seed a cluster
    pub fn with_cluster(self, cluster: Cluster) -> Self {
        self.clusters.insert(cluster.metadata.id.clone(), cluster);
        self
    }

    /// Make every call fail as if the API were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject instance and cluster creation with `reason`
    pub fn reject_creates(&self, reason: Option<&str>) {
        *self.create_rejection.write() = reason.map(str::to_string);
    }

    /// Number of calls made to an operation
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.get(operation).map(|c| *c).unwrap_or(0)
    }

    /// Current copy of an instance
    pub fn instance(&self, instance_id: &str) -> Option<Instance> {
        self.instances.get(instance_id).map(|i| i.clone())
    }

    /// Current copy of a cluster
    pub fn cluster(&self, cluster_id: &str) -> Option<Cluster> {
        self.clusters.get(cluster_id).map(|c| c.clone())
    }

    fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
        *self.calls.entry(operation).or_insert(0) += 1;

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Request("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_create(&self) -> Result<(), ApiError> {
        match self.create_rejection.read().as_ref() {
            Some(reason) => Err(ApiError::Request(reason.clone())),
            None => Ok(()),
        }
    }

    fn set_power_state(&self, instance_id: &str, state: &str) -> Result<(), ApiError> {
        let mut instance = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| instance_not_found(instance_id))?;

        instance
            .status
            .get_or_insert_with(InstanceStatus::default)
            .power_state = Some(state.to_string());
        Ok(())
    }
}

fn instance_not_found(id: &str) -> ApiError {
    ApiError::NotFound {
        kind: "instance",
        id: id.to_string(),
    }
}

#[async_trait]
impl ComputeApi for InMemoryComputeApi {
    async fn list_networks(&self) -> Result<Vec<Network>, ApiError> {
        self.enter("list_networks")?;
        Ok(self.networks.iter().map(|n| n.clone()).collect())
    }

    async fn get_network(&self, network_id: &str) -> Result<Network, ApiError> {
        self.enter("get_network")?;
        self.networks
            .get(network_id)
            .map(|n| n.clone())
            .ok_or_else(|| ApiError::NotFound {
                kind: "network",
                id: network_id.to_string(),
            })
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, ApiError> {
        self.enter("list_instances")?;
        Ok(self.instances.iter().map(|i| i.clone()).collect())
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance, ApiError> {
        self.enter("get_instance")?;
        self.instance(instance_id)
            .ok_or_else(|| instance_not_found(instance_id))
    }

    async fn create_instance(&self, mut instance: Instance) -> Result<Instance, ApiError> {
        self.enter("create_instance")?;
        self.check_create()?;

        if instance.metadata.id.is_empty() {
            instance.metadata.id = instance.metadata.name.clone();
        }
        instance.status = Some(InstanceStatus {
            power_state: Some(POWER_RUNNING.to_string()),
            provisioning_status: Some(PROVISIONED.to_string()),
        });

        self.instances
            .insert(instance.metadata.id.clone(), instance.clone());
        Ok(instance)
    }

    async fn update_instance(
        &self,
        instance_id: &str,
        spec: InstanceSpec,
    ) -> Result<Instance, ApiError> {
        self.enter("update_instance")?;
        let mut instance = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| instance_not_found(instance_id))?;

        let current = &mut instance.spec;
        if spec.flavor_id.is_some() {
            current.flavor_id = spec.flavor_id;
        }
        if spec.image_id.is_some() {
            current.image_id = spec.image_id;
        }
        if spec.cpu.is_some() {
            current.cpu = spec.cpu;
        }
        if spec.memory.is_some() {
            current.memory = spec.memory;
        }
        if spec.storage.is_some() {
            current.storage = spec.storage;
        }
        if spec.networking.is_some() {
            current.networking = spec.networking;
        }

        Ok(instance.clone())
    }

    async fn start_instance(&self, instance_id: &str) -> Result<(), ApiError> {
        self.enter("start_instance")?;
        self.set_power_state(instance_id, POWER_RUNNING)
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<(), ApiError> {
        self.enter("stop_instance")?;
        self.set_power_state(instance_id, POWER_STOPPED)
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<(), ApiError> {
        self.enter("delete_instance")?;
        self.instances
            .remove(instance_id)
            .map(|_| ())
            .ok_or_else(|| instance_not_found(instance_id))
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>, ApiError> {
        self.enter("list_clusters")?;
        Ok(self.clusters.iter().map(|c| c.clone()).collect())
    }

    async fn create_cluster(&self, mut cluster: Cluster) -> Result<Cluster, ApiError> {
        self.enter("create_cluster")?;
        self.check_create()?;

        if cluster.metadata.id.is_empty() {
            cluster.metadata.id = cluster.metadata.name.clone();
        }
        cluster.status = Some(ClusterStatus {
            provisioning_status: Some(PROVISIONED.to_string()),
        });

        self.clusters
            .insert(cluster.metadata.id.clone(), cluster.clone());
        Ok(cluster)
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), ApiError> {
        self.enter("delete_cluster")?;
        self.clusters
            .remove(cluster_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound {
                kind: "cluster",
                id: cluster_id.to_string(),
            })
    }
}
