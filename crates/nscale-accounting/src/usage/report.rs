//! Usage reporting
//!
//! Usage is read from the instance spec (backend units) and divided by the
//! component factor to get Waldur units. Components the backend has no
//! field for report zero.

use crate::conversion::UnitConverter;
use nscale_common::{ConversionError, Instance, TOTAL_ACCOUNT_USAGE};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

/// Usage per component, in Waldur units
pub type ComponentUsage = BTreeMap<String, Decimal>;

/// Usage for a batch of backend resources
///
/// Each resource maps usage keys (only [`TOTAL_ACCOUNT_USAGE`] today) to
/// per-component usage.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    /// Report timestamp (Unix millis)
    pub collected_at: i64,
    /// Usage by backend ID
    pub resources: BTreeMap<String, BTreeMap<String, ComponentUsage>>,
}

impl UsageReport {
    pub fn new() -> Self {
        Self {
            collected_at: chrono::Utc::now().timestamp_millis(),
            resources: BTreeMap::new(),
        }
    }

    /// Record account-wide usage for a resource
    pub fn insert_total(&mut self, backend_id: impl Into<String>, usage: ComponentUsage) {
        self.resources
            .entry(backend_id.into())
            .or_default()
            .insert(TOTAL_ACCOUNT_USAGE.to_string(), usage);
    }

    /// Account-wide usage for a resource
    pub fn total(&self, backend_id: &str) -> Option<&ComponentUsage> {
        self.resources
            .get(backend_id)
            .and_then(|usage| usage.get(TOTAL_ACCOUNT_USAGE))
    }

    pub fn contains(&self, backend_id: &str) -> bool {
        self.resources.contains_key(backend_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for UsageReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps instance documents to component usage
#[derive(Debug, Clone)]
pub struct UsageReporter {
    converter: UnitConverter,
}

impl UsageReporter {
    pub fn new(converter: UnitConverter) -> Self {
        Self { converter }
    }

    /// Usage of every configured component for one instance
    #[instrument(skip(self, instance), fields(instance_id = %instance.metadata.id))]
    pub fn instance_usage(&self, instance: &Instance) -> Result<ComponentUsage, ConversionError> {
        let mut usage = ComponentUsage::new();

        for (name, spec) in self.converter.table().iter() {
            let value = match instance.quantity(spec.component_type()) {
                Some(backend_value) => self.converter.to_waldur(name, backend_value)?,
                None => Decimal::ZERO,
            };
            usage.insert(name.to_string(), value);
        }

        Ok(usage)
    }

    /// Every configured component at zero
    pub fn empty_usage(&self) -> ComponentUsage {
        self.converter
            .table()
            .names()
            .into_iter()
            .map(|name| (name, Decimal::ZERO))
            .collect()
    }
}
