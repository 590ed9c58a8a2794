//! Billable components and their unit factors
//!
//! A component is one billable dimension of a Waldur resource (CPU, memory,
//! storage, ...). Each component carries a unit factor that converts a
//! quantity in Waldur's native unit into the backend's accounting unit:
//!
//! ```text
//! backend_quantity = waldur_quantity × unit_factor
//! ```
//!
//! Factors are validated once, when the component is loaded, and stored as
//! exact decimals so billing figures do not drift.

use crate::error::ConversionError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Billable resource dimension
///
/// Known dimensions get their own variant; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    Cpu,
    Memory,
    Storage,
    Gpu,
    Other(String),
}

impl ComponentType {
    /// Configuration name of this component
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Cpu => "cpu",
            ComponentType::Memory => "memory",
            ComponentType::Storage => "storage",
            ComponentType::Gpu => "gpu",
            ComponentType::Other(name) => name,
        }
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        match name {
            "cpu" => ComponentType::Cpu,
            "memory" => ComponentType::Memory,
            "storage" => ComponentType::Storage,
            "gpu" => ComponentType::Gpu,
            other => ComponentType::Other(other.to_string()),
        }
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        ComponentType::from(name.as_str())
    }
}

impl From<ComponentType> for String {
    fn from(component: ComponentType) -> Self {
        component.as_str().to_string()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a component's consumption is billed
///
/// Only limit-based accounting (reserved capacity) is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingType {
    /// Billed by the capacity reserved for the resource
    #[default]
    Limit,
}

/// Strictly positive, finite conversion ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitFactor(Decimal);

impl UnitFactor {
    /// Identity factor (pass-through)
    pub const ONE: UnitFactor = UnitFactor(Decimal::ONE);

    /// Validate a raw factor from configuration
    pub fn new(factor: f64) -> Result<Self, ConversionError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConversionError::InvalidConfiguration { factor });
        }

        // Factors below decimal precision round to zero
        match Decimal::try_from(factor) {
            Ok(value) if value > Decimal::ZERO => Ok(Self(value)),
            _ => Err(ConversionError::InvalidConfiguration { factor }),
        }
    }

    /// Validate an already-decimal factor
    pub fn from_decimal(factor: Decimal) -> Result<Self, ConversionError> {
        if factor <= Decimal::ZERO {
            return Err(ConversionError::InvalidConfiguration {
                factor: factor.to_f64().unwrap_or(0.0),
            });
        }
        Ok(Self(factor))
    }

    /// Decimal value of the factor
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for UnitFactor {
    fn default() -> Self {
        UnitFactor::ONE
    }
}

impl fmt::Display for UnitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_unit_factor() -> f64 {
    1.0
}

/// Per-component configuration entry, as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Accounting policy (only "limit")
    pub accounting_type: AccountingType,

    /// Waldur-to-backend multiplier
    #[serde(default = "default_unit_factor")]
    pub unit_factor: f64,

    /// Display label for the converted unit (e.g. "GB", "core-hours")
    #[serde(default)]
    pub measured_unit: String,

    /// Human-readable component name
    #[serde(default)]
    pub label: Option<String>,
}

impl ComponentConfig {
    pub fn new(unit_factor: f64, measured_unit: impl Into<String>) -> Self {
        Self {
            accounting_type: AccountingType::Limit,
            unit_factor,
            measured_unit: measured_unit.into(),
            label: None,
        }
    }
}

/// Validated billable component
///
/// Constructed once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    component_type: ComponentType,
    accounting_type: AccountingType,
    unit_factor: UnitFactor,
    measured_unit: String,
    label: Option<String>,
}

impl ComponentSpec {
    /// Create a limit-accounted component, rejecting invalid factors
    pub fn new(
        component_type: impl Into<ComponentType>,
        unit_factor: f64,
        measured_unit: impl Into<String>,
    ) -> Result<Self, ConversionError> {
        Ok(Self::with_factor(
            component_type,
            UnitFactor::new(unit_factor)?,
            measured_unit,
        ))
    }

    /// Create a component from an already validated factor
    pub fn with_factor(
        component_type: impl Into<ComponentType>,
        unit_factor: UnitFactor,
        measured_unit: impl Into<String>,
    ) -> Self {
        Self {
            component_type: component_type.into(),
            accounting_type: AccountingType::Limit,
            unit_factor,
            measured_unit: measured_unit.into(),
            label: None,
        }
    }

    /// Build from a named configuration entry
    pub fn from_config(name: &str, config: &ComponentConfig) -> Result<Self, ConversionError> {
        let mut spec = Self::new(name, config.unit_factor, config.measured_unit.clone())?;
        spec.accounting_type = config.accounting_type;
        spec.label = config.label.clone();
        Ok(spec)
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    pub fn accounting_type(&self) -> AccountingType {
        self.accounting_type
    }

    pub fn unit_factor(&self) -> UnitFactor {
        self.unit_factor
    }

    pub fn measured_unit(&self) -> &str {
        &self.measured_unit
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_component_type_names() {
        assert_eq!(ComponentType::from("cpu"), ComponentType::Cpu);
        assert_eq!(ComponentType::from("memory"), ComponentType::Memory);
        assert_eq!(
            ComponentType::from("ram_gb"),
            ComponentType::Other("ram_gb".to_string())
        );
        assert_eq!(ComponentType::Storage.to_string(), "storage");
    }

    #[test]
    fn test_unit_factor_validation() {
        assert_eq!(UnitFactor::new(1024.0).unwrap().value(), dec!(1024));
        assert_eq!(
            UnitFactor::new(1.0 / 1024.0).unwrap().value(),
            dec!(0.0009765625)
        );

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                UnitFactor::new(bad),
                Err(ConversionError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_unit_factor_below_precision() {
        assert!(UnitFactor::new(1e-40).is_err());
    }

    #[test]
    fn test_unit_factor_from_decimal() {
        assert!(UnitFactor::from_decimal(dec!(0.5)).is_ok());
        assert!(UnitFactor::from_decimal(Decimal::ZERO).is_err());
        assert!(UnitFactor::from_decimal(dec!(-2)).is_err());
    }

    #[test]
    fn test_component_from_config() {
        let config = ComponentConfig {
            accounting_type: AccountingType::Limit,
            unit_factor: 1024.0,
            measured_unit: "MB".to_string(),
            label: Some("Memory".to_string()),
        };

        let spec = ComponentSpec::from_config("memory", &config).unwrap();
        assert_eq!(spec.component_type(), &ComponentType::Memory);
        assert_eq!(spec.unit_factor().value(), dec!(1024));
        assert_eq!(spec.measured_unit(), "MB");
        assert_eq!(spec.label(), Some("Memory"));
    }

    #[test]
    fn test_negative_factor_rejected() {
        let err = ComponentSpec::new("cpu", -1.0, "core-hours").unwrap_err();
        assert_eq!(err, ConversionError::InvalidConfiguration { factor: -1.0 });
    }

    #[test]
    fn test_usage_accounting_rejected() {
        let raw = r#"{"accounting_type": "usage", "unit_factor": 1}"#;
        assert!(serde_json::from_str::<ComponentConfig>(raw).is_err());

        let raw = r#"{"accounting_type": "limit"}"#;
        let config: ComponentConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.unit_factor, 1.0);
        assert_eq!(config.accounting_type, AccountingType::default());
    }
}
