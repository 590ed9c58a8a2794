//! Draft documents for new backend resources
//!
//! Drafts are built from the backend settings alone; limits are applied to
//! instances after creation.

use nscale_common::{
    BackendSettings, Cluster, ClusterSpec, Instance, InstanceSpec, Networking,
    ResourceMetadata, WorkloadPool,
};

/// Name of the single workload pool in a new cluster
pub const DEFAULT_POOL_NAME: &str = "default";

/// Draft instance named after the backend ID
pub fn instance_draft(settings: &BackendSettings, backend_id: &str) -> Instance {
    let networking = if settings.default_network_id.is_some()
        || !settings.default_security_group_ids.is_empty()
    {
        Some(Networking {
            network_id: settings.default_network_id.clone(),
            security_group_ids: settings.default_security_group_ids.clone(),
        })
    } else {
        None
    };

    Instance {
        metadata: ResourceMetadata::new("", backend_id),
        spec: InstanceSpec {
            flavor_id: Some(settings.default_instance_type.clone()),
            image_id: settings.default_image_id.clone(),
            networking,
            ..Default::default()
        },
        status: None,
    }
}

/// Draft cluster with one pool of the default flavor
pub fn cluster_draft(settings: &BackendSettings, backend_id: &str) -> Cluster {
    Cluster {
        metadata: ResourceMetadata::new("", backend_id),
        spec: ClusterSpec {
            workload_pools: vec![WorkloadPool {
                name: DEFAULT_POOL_NAME.to_string(),
                replicas: 1,
                flavor_id: settings.default_instance_type.clone(),
            }],
        },
        status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BackendSettings {
        BackendSettings::new(
            "https://compute.nks.example.com",
            "org-test-123",
            "proj-test-456",
            "test-token-abc",
        )
        .unwrap()
    }

    #[test]
    fn test_instance_draft_defaults() {
        let draft = instance_draft(&settings(), "test-resource-001");

        assert_eq!(draft.metadata.name, "test-resource-001");
        assert!(draft.metadata.id.is_empty());
        assert_eq!(draft.spec.flavor_id.as_deref(), Some("standard"));
        assert_eq!(draft.spec.image_id, None);
        assert_eq!(draft.spec.networking, None);
        assert_eq!(draft.spec.cpu, None);
    }

    #[test]
    fn test_instance_draft_networking() {
        let mut settings = settings();
        settings.default_image_id = Some("ubuntu-22.04".to_string());
        settings.default_network_id = Some("net-test-789".to_string());
        settings.default_security_group_ids = vec!["sg-default".to_string()];

        let draft = instance_draft(&settings, "test-resource-001");
        let networking = draft.spec.networking.unwrap();

        assert_eq!(draft.spec.image_id.as_deref(), Some("ubuntu-22.04"));
        assert_eq!(networking.network_id.as_deref(), Some("net-test-789"));
        assert_eq!(networking.security_group_ids, vec!["sg-default"]);
    }

    #[test]
    fn test_cluster_draft() {
        let draft = cluster_draft(&settings(), "test-cluster-001");

        assert_eq!(draft.metadata.name, "test-cluster-001");
        assert_eq!(draft.spec.workload_pools.len(), 1);
        assert_eq!(draft.spec.workload_pools[0].name, DEFAULT_POOL_NAME);
        assert_eq!(draft.spec.workload_pools[0].replicas, 1);
        assert_eq!(draft.spec.workload_pools[0].flavor_id, "standard");
    }
}
