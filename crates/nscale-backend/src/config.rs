//! Agent configuration
//!
//! Layout of a configuration file (TOML shown; YAML and JSON also work):
//!
//! ```toml
//! [settings]
//! api_url = "https://compute.nks.example.com"
//! organization_id = "org-1"
//! project_id = "proj-1"
//! service_token = "..."
//!
//! [components.memory]
//! accounting_type = "limit"
//! unit_factor = 1024
//! measured_unit = "MB"
//! ```
//!
//! Environment variables prefixed `NSCALE__` override file values, with `__`
//! between path segments (e.g. `NSCALE__SETTINGS__SERVICE_TOKEN`).

use config::{Config, Environment, File, FileFormat};
use nscale_accounting::ComponentTable;
use nscale_common::{BackendSettings, ComponentConfig, ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "NSCALE";

/// Configuration as written on disk
#[derive(Debug, Deserialize)]
struct ConfigFile {
    settings: BackendSettings,
    #[serde(default)]
    components: BTreeMap<String, ComponentConfig>,
}

/// Validated agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Connection and resource defaults
    pub settings: BackendSettings,
    /// Billable components
    pub components: ComponentTable,
}

impl AgentConfig {
    /// Load configuration from a file, `.env` and the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let source = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config = Self::from_source(source)?;
        info!(
            path = %path.as_ref().display(),
            components = config.components.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let source = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        Self::from_source(source)
    }

    fn from_source(source: Config) -> Result<Self> {
        let file: ConfigFile = source
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let components = ComponentTable::from_configs(&file.components)?;

        Ok(Self {
            settings: file.settings,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nscale_common::{NscaleError, ResourceType};
    use rust_decimal_macros::dec;

    const FULL: &str = r#"
        [settings]
        api_url = "https://compute.nks.example.com/"
        organization_id = "org-test-123"
        project_id = "proj-test-456"
        service_token = "test-token-abc"
        identity_api_url = "https://identity.nks.example.com"
        resource_prefix = "waldur_"
        default_instance_type = "g-4-standard"
        default_image_id = "ubuntu-22.04"
        default_network_id = "net-test-789"
        default_security_group_ids = ["sg-default", "sg-ssh"]

        [components.cpu]
        accounting_type = "limit"
        unit_factor = 1
        measured_unit = "core-hours"
        label = "CPU Cores"

        [components.memory]
        accounting_type = "limit"
        unit_factor = 1024
        measured_unit = "MB"

        [components.storage]
        accounting_type = "limit"
        unit_factor = 0.0009765625
        measured_unit = "GB"
    "#;

    #[test]
    fn test_full_config() {
        let config = AgentConfig::from_toml_str(FULL).unwrap();

        assert_eq!(config.settings.api_url, "https://compute.nks.example.com");
        assert_eq!(config.settings.default_instance_type, "g-4-standard");
        assert_eq!(config.settings.default_image_id.as_deref(), Some("ubuntu-22.04"));
        assert_eq!(
            config.settings.default_security_group_ids,
            vec!["sg-default", "sg-ssh"]
        );
        assert_eq!(config.settings.resource_type, ResourceType::Instance);

        assert_eq!(config.components.names(), vec!["cpu", "memory", "storage"]);
        let memory = config.components.get("memory").unwrap();
        assert_eq!(memory.unit_factor().value(), dec!(1024));
        assert_eq!(config.components.get("cpu").unwrap().label(), Some("CPU Cores"));
    }

    #[test]
    fn test_minimal_config() {
        let config = AgentConfig::from_toml_str(
            r#"
            [settings]
            api_url = "https://compute.nks.example.com"
            organization_id = "org-1"
            project_id = "proj-1"
            service_token = "token-1"
            resource_type = "cluster"
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.resource_prefix, "waldur_");
        assert_eq!(config.settings.default_instance_type, "standard");
        assert_eq!(config.settings.resource_type, ResourceType::Cluster);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_missing_setting() {
        let err = AgentConfig::from_toml_str(
            r#"
            [settings]
            api_url = "https://compute.nks.example.com"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Missing required setting"));
    }

    #[test]
    fn test_negative_unit_factor_rejected() {
        let err = AgentConfig::from_toml_str(
            r#"
            [settings]
            api_url = "https://compute.nks.example.com"
            organization_id = "org-1"
            project_id = "proj-1"
            service_token = "token-1"

            [components.cpu]
            accounting_type = "limit"
            unit_factor = -1
            "#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NscaleError::Config(ConfigError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_usage_accounting_rejected() {
        let err = AgentConfig::from_toml_str(
            r#"
            [settings]
            api_url = "https://compute.nks.example.com"
            organization_id = "org-1"
            project_id = "proj-1"
            service_token = "token-1"

            [components.cpu]
            accounting_type = "usage"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, NscaleError::Config(ConfigError::Load(_))));
    }

    // Only test in this module that touches NSCALE__ variables
    #[test]
    fn test_environment_overrides_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/nscale.example.toml");
        let token_key = "NSCALE__SETTINGS__SERVICE_TOKEN";
        let factor_key = "NSCALE__COMPONENTS__MEMORY__UNIT_FACTOR";

        std::env::set_var(token_key, "token-from-env");
        std::env::set_var(factor_key, "2048");
        let loaded = AgentConfig::load(path);

        std::env::set_var(factor_key, "-1");
        let rejected = AgentConfig::load(path);

        std::env::remove_var(token_key);
        std::env::remove_var(factor_key);

        let config = loaded.unwrap();
        assert_eq!(config.settings.service_token.expose(), "token-from-env");
        assert_eq!(
            config.components.get("memory").unwrap().unit_factor().value(),
            dec!(2048)
        );
        // Untouched file values survive
        assert_eq!(config.settings.project_id, "proj-example");
        assert_eq!(config.components.get("cpu").unwrap().unit_factor().value(), dec!(1));

        assert!(matches!(
            rejected.unwrap_err(),
            NscaleError::Config(ConfigError::InvalidComponent { .. })
        ));
    }
}
