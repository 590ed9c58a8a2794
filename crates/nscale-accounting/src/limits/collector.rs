//! Resource limit collection
//!
//! Waldur sends limits in its native units. Only limits for configured
//! components are kept; each one is converted with the component's factor.

use crate::conversion::UnitConverter;
use nscale_common::{ConversionError, ResourceLimits};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Limits in both unit systems, over the same component keys
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectedLimits {
    /// Limits in backend units
    pub backend: BTreeMap<String, Decimal>,
    /// The same limits in Waldur units, untouched
    pub waldur: BTreeMap<String, f64>,
}

impl CollectedLimits {
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }
}

/// Applies the unit converter to resource limits
#[derive(Debug, Clone)]
pub struct LimitCollector {
    converter: UnitConverter,
}

impl LimitCollector {
    pub fn new(converter: UnitConverter) -> Self {
        Self { converter }
    }

    /// Collect backend and Waldur limits
    ///
    /// Limits for components that are not configured are ignored. The first
    /// invalid quantity aborts the collection.
    #[instrument(skip(self, limits), fields(count = limits.len()))]
    pub fn collect(&self, limits: &ResourceLimits) -> Result<CollectedLimits, ConversionError> {
        let mut collected = CollectedLimits::default();

        for (component, spec) in self.converter.table().iter() {
            let Some(&limit) = limits.get(component) else {
                continue;
            };

            let converted = UnitConverter::convert(limit, spec)?;
            collected.backend.insert(component.to_string(), converted);
            collected.waldur.insert(component.to_string(), limit);
        }

        let ignored = limits
            .keys()
            .filter(|key| !self.converter.table().contains(key))
            .count();
        if ignored > 0 {
            debug!(ignored, "Ignored limits for unconfigured components");
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ComponentTable;
    use nscale_common::ComponentSpec;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn collector(memory_factor: f64) -> LimitCollector {
        let table = ComponentTable::from_specs(vec![
            ComponentSpec::new("cpu", 1.0, "core-hours").unwrap(),
            ComponentSpec::new("memory", memory_factor, "GB-hours").unwrap(),
            ComponentSpec::new("storage", 1.0, "GB").unwrap(),
            ComponentSpec::new("gpu", 1.0, "gpu-hours").unwrap(),
        ]);
        LimitCollector::new(UnitConverter::new(Arc::new(table)))
    }

    fn limits() -> ResourceLimits {
        ResourceLimits::from([
            ("cpu".to_string(), 4.0),
            ("memory".to_string(), 8.0),
            ("storage".to_string(), 100.0),
            ("gpu".to_string(), 1.0),
        ])
    }

    #[test]
    fn test_collect_limits() {
        let collected = collector(1.0).collect(&limits()).unwrap();

        assert_eq!(collected.backend["cpu"], dec!(4));
        assert_eq!(collected.backend["memory"], dec!(8));
        assert_eq!(collected.backend["storage"], dec!(100));
        assert_eq!(collected.backend["gpu"], dec!(1));
        assert_eq!(collected.waldur["cpu"], 4.0);
        assert_eq!(collected.waldur["memory"], 8.0);
    }

    #[test]
    fn test_collect_limits_with_unit_factor() {
        let collected = collector(1024.0).collect(&limits()).unwrap();

        assert_eq!(collected.backend["memory"], dec!(8192));
        assert_eq!(collected.waldur["memory"], 8.0);
    }

    #[test]
    fn test_unconfigured_limits_ignored() {
        let mut limits = limits();
        limits.insert("bandwidth".to_string(), 10.0);

        let collected = collector(1.0).collect(&limits).unwrap();
        assert_eq!(collected.len(), 4);
        assert!(!collected.backend.contains_key("bandwidth"));
    }

    #[test]
    fn test_empty_limits() {
        let collected = collector(1.0).collect(&ResourceLimits::new()).unwrap();
        assert!(collected.is_empty());
        assert!(collected.waldur.is_empty());
    }

    #[test]
    fn test_negative_limit_fails() {
        let mut limits = limits();
        limits.insert("cpu".to_string(), -2.0);

        assert!(matches!(
            collector(1.0).collect(&limits),
            Err(ConversionError::InvalidQuantity { .. })
        ));
    }
}
