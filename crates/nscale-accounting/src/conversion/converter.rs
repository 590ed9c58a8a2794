//! Unit converter
//!
//! Converts component quantities between Waldur's native units and the
//! backend's accounting units:
//! - Factors are validated before quantities
//! - Quantities must be non-negative and finite
//! - Results are exact decimals; overflow is an error, never a clamp

use super::table::ComponentTable;
use nscale_common::{ComponentSpec, ConversionError, UnitFactor};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

/// Per-component unit converter over a shared component table
#[derive(Debug, Clone)]
pub struct UnitConverter {
    table: Arc<ComponentTable>,
}

impl UnitConverter {
    pub fn new(table: Arc<ComponentTable>) -> Self {
        Self { table }
    }

    /// Converted quantity: `quantity × spec.unit_factor`
    pub fn convert(quantity: f64, spec: &ComponentSpec) -> Result<Decimal, ConversionError> {
        Self::apply(quantity, spec.unit_factor())
    }

    /// Same as [`UnitConverter::convert`] on an unvalidated factor
    ///
    /// The factor is checked first, so a bad configuration is reported even
    /// when the quantity is also invalid.
    pub fn convert_raw(quantity: f64, unit_factor: f64) -> Result<Decimal, ConversionError> {
        let factor = UnitFactor::new(unit_factor)?;
        Self::apply(quantity, factor)
    }

    /// Multiply a validated quantity by a factor
    pub fn apply(quantity: f64, factor: UnitFactor) -> Result<Decimal, ConversionError> {
        let quantity = decimal_quantity(quantity, factor)?;
        scale(quantity, factor)
    }

    /// Waldur quantity → backend quantity for a configured component
    pub fn to_backend(&self, component: &str, quantity: f64) -> Result<Decimal, ConversionError> {
        let spec = self.table.require(component)?;
        let converted = Self::convert(quantity, spec)?;
        trace!(component, quantity, %converted, "Converted to backend units");
        Ok(converted)
    }

    /// Backend quantity → Waldur quantity for a configured component
    pub fn to_waldur(&self, component: &str, quantity: Decimal) -> Result<Decimal, ConversionError> {
        let spec = self.table.require(component)?;
        let converted = unscale(quantity, spec.unit_factor())?;
        trace!(component, %quantity, %converted, "Converted to Waldur units");
        Ok(converted)
    }

    /// Table this converter reads from
    pub fn table(&self) -> &ComponentTable {
        &self.table
    }
}

/// Quantity as a decimal; out-of-range values overflow the product with `factor`
fn decimal_quantity(quantity: f64, factor: UnitFactor) -> Result<Decimal, ConversionError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ConversionError::InvalidQuantity { quantity });
    }

    Decimal::try_from(quantity).map_err(|_| ConversionError::Overflow {
        quantity: quantity.to_string(),
        factor: factor.to_string(),
    })
}

fn scale(quantity: Decimal, factor: UnitFactor) -> Result<Decimal, ConversionError> {
    quantity
        .checked_mul(factor.value())
        .map(|value| value.normalize())
        .ok_or_else(|| ConversionError::Overflow {
            quantity: quantity.to_string(),
            factor: factor.to_string(),
        })
}

fn unscale(quantity: Decimal, factor: UnitFactor) -> Result<Decimal, ConversionError> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ConversionError::InvalidQuantity {
            quantity: quantity.try_into().unwrap_or(f64::NAN),
        });
    }

    quantity
        .checked_div(factor.value())
        .map(|value| value.normalize())
        .ok_or_else(|| ConversionError::Overflow {
            quantity: quantity.to_string(),
            factor: factor.to_string(),
        })
}
