//! Nscale backend
//!
//! The operations the site agent invokes for Nscale-backed resources:
//! - Connectivity checks (`ping`, `diagnostics`)
//! - Lifecycle: create, post-create limits, delete
//! - Power management: pause and downscale stop an instance, restore starts it
//! - Reporting: metadata, limits and usage in Waldur units
//!
//! Best-effort operations (power management, metadata, usage) log failures and
//! return a neutral value; lifecycle operations return errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use nscale_accounting::{
    CollectedLimits, ComponentUsage, LimitCollector, UnitConverter, UsageReport, UsageReporter,
};
use nscale_common::{
    ApiError, BackendError, BackendSettings, ClientResource, Instance, ResourceLimits,
    ResourceType, Result, BACKEND_TYPE,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::payload::{cluster_draft, instance_draft};
use crate::config::AgentConfig;
use crate::infra::compute_api::ComputeApi;

/// Backend-specific details of an instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDetails {
    pub instance_id: String,
    pub instance_name: String,
    pub flavor_id: Option<String>,
    pub power_state: Option<String>,
    pub provisioning_status: Option<String>,
    /// CPU cores, backend units
    pub cpu: Decimal,
    /// Memory, backend units
    pub memory: Decimal,
    /// Storage, backend units
    pub storage: Decimal,
}

impl ResourceDetails {
    fn from_instance(instance: &Instance) -> Self {
        let status = instance.status.clone().unwrap_or_default();

        Self {
            instance_id: instance.metadata.id.clone(),
            instance_name: instance.metadata.name.clone(),
            flavor_id: instance.spec.flavor_id.clone(),
            power_state: status.power_state,
            provisioning_status: status.provisioning_status,
            cpu: instance.spec.cpu.unwrap_or_default(),
            memory: instance.spec.memory.unwrap_or_default(),
            storage: instance.spec.storage.unwrap_or_default(),
        }
    }
}

/// Nscale backend over a compute API
pub struct NscaleBackend {
    settings: BackendSettings,
    converter: UnitConverter,
    limits: LimitCollector,
    usage: UsageReporter,
    api: Arc<dyn ComputeApi>,
}

impl NscaleBackend {
    /// Create a backend from validated configuration
    pub fn new(config: AgentConfig, api: Arc<dyn ComputeApi>) -> Self {
        let converter = UnitConverter::new(Arc::new(config.components));

        Self {
            settings: config.settings,
            limits: LimitCollector::new(converter.clone()),
            usage: UsageReporter::new(converter.clone()),
            converter,
            api,
        }
    }

    pub fn backend_type(&self) -> &'static str {
        BACKEND_TYPE
    }

    /// Usage may go down between reports (limits are reduced)
    pub fn supports_decreasing_usage(&self) -> bool {
        true
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    /// Check that the compute API is reachable
    ///
    /// With `raise`, an unreachable API is an error instead of `false`.
    #[instrument(skip(self))]
    pub async fn ping(&self, raise: bool) -> Result<bool> {
        match self.api.list_networks().await {
            Ok(_) => Ok(true),
            Err(e) if raise => Err(BackendError::Unavailable(e.to_string()).into()),
            Err(e) => {
                error!(error = %e, "Nscale backend not available");
                Ok(false)
            }
        }
    }

    /// Log resource counts in the project
    #[instrument(skip(self))]
    pub async fn diagnostics(&self) -> bool {
        match self.resource_counts().await {
            Ok((networks, instances, clusters)) => {
                info!(networks, instances, clusters, "Nscale backend diagnostics");
                true
            }
            Err(e) => {
                error!(error = %e, "Nscale diagnostics failed");
                false
            }
        }
    }

    async fn resource_counts(&self) -> std::result::Result<(usize, usize, usize), ApiError> {
        let networks = self.api.list_networks().await?.len();
        let instances = self.api.list_instances().await?.len();
        let clusters = self.api.list_clusters().await?.len();
        Ok((networks, instances, clusters))
    }

    /// Configured component names
    pub fn list_components(&self) -> Vec<String> {
        self.converter.table().names()
    }

    /// Check the default network before creating a resource
    #[instrument(skip(self))]
    pub async fn pre_create_resource(&self) {
        let Some(network_id) = self.settings.default_network_id.as_deref() else {
            return;
        };

        if let Err(e) = self.api.get_network(network_id).await {
            warn!(network_id, error = %e, "Default network not found");
        }
    }

    /// Backend and Waldur limits for the configured components
    pub fn collect_resource_limits(&self, limits: &ResourceLimits) -> Result<CollectedLimits> {
        Ok(self.limits.collect(limits)?)
    }

    /// Create the backend resource unless it already exists
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn create_backend_resource(&self, backend_id: &str, name: &str) -> Result<bool> {
        info!(name, resource_type = ?self.settings.resource_type, "Creating resource in Nscale");

        if self.get_resource(backend_id).await.is_some() {
            info!("Resource already exists in Nscale");
            return Ok(true);
        }

        match self.settings.resource_type {
            ResourceType::Instance => {
                let created = self
                    .api
                    .create_instance(instance_draft(&self.settings, backend_id))
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Failed to create compute instance");
                        BackendError::CreateInstance(e.to_string())
                    })?;
                info!(instance_id = %created.metadata.id, "Created compute instance");
            }
            ResourceType::Cluster => {
                let created = self
                    .api
                    .create_cluster(cluster_draft(&self.settings, backend_id))
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Failed to create cluster");
                        BackendError::CreateCluster(e.to_string())
                    })?;
                info!(cluster_id = %created.metadata.id, "Created compute cluster");
            }
        }

        Ok(true)
    }

    /// Apply limits to a freshly created instance
    ///
    /// Clusters are sized by their workload pools and are left untouched.
    #[instrument(skip(self, limits), fields(resource_id = %backend_id))]
    pub async fn post_create_resource(&self, backend_id: &str, limits: &ResourceLimits) -> Result<()> {
        if self.settings.resource_type != ResourceType::Instance {
            return Ok(());
        }

        let collected = self.limits.collect(limits)?;
        if collected.is_empty() {
            debug!("No limits to apply");
            return Ok(());
        }

        let mut patch = Instance::default();
        for (component, value) in &collected.backend {
            let spec = self.converter.table().require(component)?;
            if !patch.set_quantity(spec.component_type(), *value) {
                debug!(component = %component, "Instance has no field for component");
            }
        }

        info!(limits = ?collected.backend, "Updating instance with limits");
        self.api
            .update_instance(backend_id, patch.spec)
            .await
            .map_err(|e| BackendError::UpdateLimits {
                id: backend_id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    /// Waldur-unit limits to track for a resource
    ///
    /// Limits reach the backend in [`NscaleBackend::post_create_resource`].
    pub fn setup_resource_limits(&self, limits: &ResourceLimits) -> Result<BTreeMap<String, f64>> {
        let collected = self.limits.collect(limits)?;

        if collected.is_empty() {
            info!("Skipping setting of limits");
            return Ok(BTreeMap::new());
        }

        info!(limits = ?collected.backend, "Setting resource backend limits");
        Ok(collected.waldur)
    }

    /// Delete the backend resource
    ///
    /// A blank ID or a resource that is already gone is not an error.
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn delete_resource(&self, backend_id: &str) -> Result<()> {
        if backend_id.trim().is_empty() {
            warn!("Empty backend ID, skipping deletion");
            return Ok(());
        }

        let result = match self.settings.resource_type {
            ResourceType::Instance => self.api.delete_instance(backend_id).await,
            ResourceType::Cluster => self.api.delete_cluster(backend_id).await,
        };

        match result {
            Ok(()) => {
                info!("Deleted resource from Nscale");
                Ok(())
            }
            Err(ApiError::NotFound { .. }) => {
                warn!("Resource not found in Nscale, treating as deleted");
                Ok(())
            }
            Err(e) => Err(BackendError::Delete {
                id: backend_id.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Stop the instance
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn pause_resource(&self, backend_id: &str) -> bool {
        info!("Pausing resource");
        self.power(backend_id, false).await
    }

    /// Stop the instance
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn downscale_resource(&self, backend_id: &str) -> bool {
        info!("Downscaling resource");
        self.power(backend_id, false).await
    }

    /// Start the instance again after pause or downscale
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn restore_resource(&self, backend_id: &str) -> bool {
        info!("Restoring resource");
        self.power(backend_id, true).await
    }

    async fn power(&self, backend_id: &str, on: bool) -> bool {
        let result = if on {
            self.api.start_instance(backend_id).await
        } else {
            self.api.stop_instance(backend_id).await
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, power_on = on, "Failed to change power state");
                false
            }
        }
    }

    /// Instance details, or `None` if the instance cannot be read
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn get_resource_metadata(&self, backend_id: &str) -> Option<ResourceDetails> {
        match self.api.get_instance(backend_id).await {
            Ok(instance) => Some(ResourceDetails::from_instance(&instance)),
            Err(e) => {
                error!(error = %e, "Failed to get resource metadata");
                None
            }
        }
    }

    /// Current instance size in Waldur units; empty if it cannot be read
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn get_resource_limits(&self, backend_id: &str) -> ComponentUsage {
        let instance = match self.api.get_instance(backend_id).await {
            Ok(instance) => instance,
            Err(e) => {
                warn!(error = %e, "Failed to get resource limits");
                return ComponentUsage::new();
            }
        };

        self.usage.instance_usage(&instance).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to convert resource limits");
            ComponentUsage::new()
        })
    }

    /// Usage per resource, in Waldur units
    ///
    /// Resources that cannot be read report zero for every component.
    #[instrument(skip(self, backend_ids), fields(count = backend_ids.len()))]
    pub async fn get_usage_report(&self, backend_ids: &[String]) -> UsageReport {
        let mut report = UsageReport::new();

        for backend_id in backend_ids {
            let usage = match self.api.get_instance(backend_id).await {
                Ok(instance) => self.usage.instance_usage(&instance).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            let usage = usage.unwrap_or_else(|reason| {
                error!(resource_id = %backend_id, error = %reason, "Failed to get usage for resource");
                self.usage.empty_usage()
            });
            report.insert_total(backend_id.clone(), usage);
        }

        report
    }

    /// Instances and clusters in the project
    ///
    /// A failed listing is logged and contributes nothing.
    #[instrument(skip(self))]
    pub async fn list_resources(&self) -> Vec<ClientResource> {
        let project = &self.settings.project_id;
        let mut resources = Vec::new();

        match self.api.list_instances().await {
            Ok(instances) => resources.extend(
                instances
                    .iter()
                    .map(|i| ClientResource::from_metadata(&i.metadata, project)),
            ),
            Err(e) => warn!(error = %e, "Failed to list compute instances"),
        }

        match self.api.list_clusters().await {
            Ok(clusters) => resources.extend(
                clusters
                    .iter()
                    .map(|c| ClientResource::from_metadata(&c.metadata, project)),
            ),
            Err(e) => warn!(error = %e, "Failed to list compute clusters"),
        }

        resources
    }

    /// Find a resource by ID among instances, then clusters
    #[instrument(skip(self), fields(resource_id = %backend_id))]
    pub async fn get_resource(&self, backend_id: &str) -> Option<ClientResource> {
        let project = &self.settings.project_id;

        if let Ok(instance) = self.api.get_instance(backend_id).await {
            return Some(ClientResource::from_metadata(&instance.metadata, project));
        }

        match self.api.list_clusters().await {
            Ok(clusters) => clusters
                .iter()
                .find(|c| c.metadata.id == backend_id)
                .map(|c| ClientResource::from_metadata(&c.metadata, project)),
            Err(e) => {
                debug!(error = %e, "Failed to list compute clusters");
                None
            }
        }
    }
}
