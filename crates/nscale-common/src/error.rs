//! Error types for the Nscale backend
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using NscaleError
pub type Result<T> = std::result::Result<T, NscaleError>;

/// Unified error type for Nscale backend operations
#[derive(Debug, Error)]
pub enum NscaleError {
    // Conversion errors
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Compute API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    // Backend operation errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Unit conversion errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Invalid configuration: unit factor {factor} must be positive and finite")]
    InvalidConfiguration { factor: f64 },

    #[error("Invalid quantity: {quantity} must be non-negative and finite")]
    InvalidQuantity { quantity: f64 },

    #[error("Conversion overflow: {quantity} x {factor}")]
    Overflow { quantity: String, factor: String },

    #[error("Component not configured: {0}")]
    UnknownComponent(String),
}

/// Settings and component validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("Invalid component {name}: {source}")]
    InvalidComponent {
        name: String,
        #[source]
        source: ConversionError,
    },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Compute API port errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("API request failed: {0}")]
    Request(String),
}

/// Backend operation errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Nscale backend not available: {0}")]
    Unavailable(String),

    #[error("Failed to create compute instance: {0}")]
    CreateInstance(String),

    #[error("Failed to create cluster: {0}")]
    CreateCluster(String),

    #[error("Failed to delete resource {id}: {reason}")]
    Delete { id: String, reason: String },

    #[error("Failed to update limits of {id}: {reason}")]
    UpdateLimits { id: String, reason: String },
}

impl From<serde_json::Error> for NscaleError {
    fn from(err: serde_json::Error) -> Self {
        NscaleError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for NscaleError {
    fn from(err: anyhow::Error) -> Self {
        NscaleError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NscaleError::Conversion(ConversionError::InvalidConfiguration { factor: -1.0 });
        assert!(err.to_string().contains("unit factor -1"));
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::CreateInstance("Quota exceeded".to_string());
        assert_eq!(err.to_string(), "Failed to create compute instance: Quota exceeded");
    }

    #[test]
    fn test_invalid_component_keeps_source() {
        let err = ConfigError::InvalidComponent {
            name: "memory".to_string(),
            source: ConversionError::InvalidConfiguration { factor: 0.0 },
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert!(err.to_string().starts_with("Invalid component memory"));
        assert!(source.unwrap().contains("unit factor 0"));
    }
}
