//! Backend settings
//!
//! Connection details and resource defaults consumed from the host agent's
//! configuration. Settings are deserialized into [`RawBackendSettings`] and
//! validated into [`BackendSettings`], which is immutable afterwards.

use crate::error::ConfigError;
use crate::{DEFAULT_INSTANCE_TYPE, DEFAULT_RESOURCE_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of backend resource backing a Waldur resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Single compute instance
    #[default]
    Instance,
    /// Compute cluster with workload pools
    Cluster,
}

/// Bearer token for the compute API
///
/// Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ServiceToken(String);

impl ServiceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceToken(***)")
    }
}

/// Settings as written in configuration, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBackendSettings {
    pub api_url: Option<String>,
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
    pub service_token: Option<ServiceToken>,
    pub resource_prefix: Option<String>,
    pub default_instance_type: Option<String>,
    pub default_image_id: Option<String>,
    pub default_network_id: Option<String>,
    pub default_security_group_ids: Option<Vec<String>>,
    pub resource_type: Option<ResourceType>,
    pub identity_api_url: Option<String>,
}

/// Validated backend settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBackendSettings")]
pub struct BackendSettings {
    /// Compute API base URL (no trailing slash)
    pub api_url: String,

    /// Nscale organization ID
    pub organization_id: String,

    /// Nscale project ID
    pub project_id: String,

    /// Service token for API authentication
    pub service_token: ServiceToken,

    /// Prefix for resource names
    pub resource_prefix: String,

    /// Default flavor for compute instances
    pub default_instance_type: String,

    /// Default image for compute instances
    pub default_image_id: Option<String>,

    /// Default network to attach resources to
    pub default_network_id: Option<String>,

    /// Security groups applied to new instances
    pub default_security_group_ids: Vec<String>,

    /// Whether Waldur resources map to instances or clusters
    pub resource_type: ResourceType,

    /// Identity API base URL, for user management
    pub identity_api_url: Option<String>,
}

impl BackendSettings {
    /// Settings with the required fields and every default
    pub fn new(
        api_url: &str,
        organization_id: impl Into<String>,
        project_id: impl Into<String>,
        service_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::try_from(RawBackendSettings {
            api_url: Some(api_url.to_string()),
            organization_id: Some(organization_id.into()),
            project_id: Some(project_id.into()),
            service_token: Some(ServiceToken::new(service_token)),
            ..Default::default()
        })
    }

    /// Switch the managed resource type
    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = resource_type;
        self
    }
}

impl TryFrom<RawBackendSettings> for BackendSettings {
    type Error = ConfigError;

    fn try_from(raw: RawBackendSettings) -> Result<Self, Self::Error> {
        let api_url = validate_url("api_url", required("api_url", raw.api_url)?)?;
        let organization_id = required("organization_id", raw.organization_id)?;
        let project_id = required("project_id", raw.project_id)?;
        let service_token = raw
            .service_token
            .filter(|token| !token.expose().trim().is_empty())
            .ok_or(ConfigError::MissingSetting("service_token"))?;

        let identity_api_url = raw
            .identity_api_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| validate_url("identity_api_url", url))
            .transpose()?;

        Ok(Self {
            api_url,
            organization_id,
            project_id,
            service_token,
            resource_prefix: raw
                .resource_prefix
                .unwrap_or_else(|| DEFAULT_RESOURCE_PREFIX.to_string()),
            default_instance_type: raw
                .default_instance_type
                .unwrap_or_else(|| DEFAULT_INSTANCE_TYPE.to_string()),
            default_image_id: non_empty(raw.default_image_id),
            default_network_id: non_empty(raw.default_network_id),
            default_security_group_ids: raw.default_security_group_ids.unwrap_or_default(),
            resource_type: raw.resource_type.unwrap_or_default(),
            identity_api_url,
        })
    }
}

fn required(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingSetting(key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Require an http(s) URL and strip trailing slashes
fn validate_url(key: &'static str, url: String) -> Result<String, ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidSetting {
            key,
            reason: format!("{} must start with http:// or https://", key),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawBackendSettings {
        RawBackendSettings {
            api_url: Some("https://compute.nks.example.com/".to_string()),
            organization_id: Some("org-test-123".to_string()),
            project_id: Some("proj-test-456".to_string()),
            service_token: Some(ServiceToken::new("test-token-abc")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = BackendSettings::try_from(raw()).unwrap();

        assert_eq!(settings.api_url, "https://compute.nks.example.com");
        assert_eq!(settings.resource_prefix, "waldur_");
        assert_eq!(settings.default_instance_type, "standard");
        assert_eq!(settings.default_image_id, None);
        assert_eq!(settings.default_network_id, None);
        assert!(settings.default_security_group_ids.is_empty());
        assert_eq!(settings.resource_type, ResourceType::Instance);
    }

    #[test]
    fn test_missing_setting() {
        let mut settings = raw();
        settings.project_id = None;

        let err = BackendSettings::try_from(settings).unwrap_err();
        assert_eq!(err.to_string(), "Missing required setting: project_id");
    }

    #[test]
    fn test_blank_token_is_missing() {
        let mut settings = raw();
        settings.service_token = Some(ServiceToken::new("  "));

        assert!(matches!(
            BackendSettings::try_from(settings),
            Err(ConfigError::MissingSetting("service_token"))
        ));
    }

    #[test]
    fn test_invalid_url() {
        let mut settings = raw();
        settings.api_url = Some("compute.nks.example.com".to_string());

        assert!(matches!(
            BackendSettings::try_from(settings),
            Err(ConfigError::InvalidSetting { key: "api_url", .. })
        ));
    }

    #[test]
    fn test_identity_url_trimmed() {
        let mut settings = raw();
        settings.identity_api_url = Some("https://identity.nks.example.com/".to_string());

        let settings = BackendSettings::try_from(settings).unwrap();
        assert_eq!(
            settings.identity_api_url.as_deref(),
            Some("https://identity.nks.example.com")
        );
    }

    #[test]
    fn test_token_redacted() {
        let settings = BackendSettings::try_from(raw()).unwrap();
        let debug = format!("{:?}", settings);

        assert!(!debug.contains("test-token-abc"));
        assert!(debug.contains("ServiceToken(***)"));
    }

    #[test]
    fn test_deserialize_cluster_settings() {
        let json = r#"{
            "api_url": "https://compute.nks.example.com",
            "organization_id": "org-1",
            "project_id": "proj-1",
            "service_token": "token-1",
            "resource_type": "cluster",
            "default_security_group_ids": ["sg-default", "sg-ssh"]
        }"#;

        let settings: BackendSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.resource_type, ResourceType::Cluster);
        assert_eq!(settings.default_security_group_ids, vec!["sg-default", "sg-ssh"]);
    }
}
