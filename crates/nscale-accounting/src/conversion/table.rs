//! Component table
//!
//! Immutable lookup of validated component specs by configuration name.

use nscale_common::{ComponentConfig, ComponentSpec, ConfigError, ConversionError};
use std::collections::BTreeMap;
use tracing::debug;

/// Validated components, keyed by configuration name
#[derive(Debug, Clone, Default)]
pub struct ComponentTable {
    specs: BTreeMap<String, ComponentSpec>,
}

impl ComponentTable {
    /// Validate every configured component; one bad entry fails the whole table
    pub fn from_configs(configs: &BTreeMap<String, ComponentConfig>) -> Result<Self, ConfigError> {
        let mut specs = BTreeMap::new();

        for (name, config) in configs {
            let spec = ComponentSpec::from_config(name, config).map_err(|source| {
                ConfigError::InvalidComponent {
                    name: name.clone(),
                    source,
                }
            })?;
            debug!(component = %name, unit_factor = %spec.unit_factor(), "Loaded component");
            specs.insert(name.clone(), spec);
        }

        Ok(Self { specs })
    }

    /// Build from specs that are already validated
    pub fn from_specs(specs: impl IntoIterator<Item = ComponentSpec>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.component_type().to_string(), spec))
                .collect(),
        }
    }

    /// Look up a component by name
    pub fn get(&self, name: &str) -> Option<&ComponentSpec> {
        self.specs.get(name)
    }

    /// Look up a component, failing if it is not configured
    pub fn require(&self, name: &str) -> Result<&ComponentSpec, ConversionError> {
        self.get(name)
            .ok_or_else(|| ConversionError::UnknownComponent(name.to_string()))
    }

    /// Component names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentSpec)> {
        self.specs.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
