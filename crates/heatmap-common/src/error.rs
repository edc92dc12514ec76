//! Error types for the heat-map pipeline.

use thiserror::Error;

/// Result type alias using HeatMapError.
pub type HeatMapResult<T> = Result<T, HeatMapError>;

/// Primary error type for heat-map operations.
#[derive(Debug, Error)]
pub enum HeatMapError {
    // === Caller Errors ===
    #[error("Invalid configuration for '{param}': {message}")]
    Configuration { param: &'static str, message: String },

    #[error("Invalid style: {0}")]
    Style(String),

    // === Rendering Errors ===
    #[error("Failed to allocate {width}x{height} drawing surface")]
    Resource { width: u32, height: u32 },

    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl HeatMapError {
    /// Shorthand for a configuration error on a named parameter.
    pub fn config(param: &'static str, message: impl Into<String>) -> Self {
        HeatMapError::Configuration {
            param,
            message: message.into(),
        }
    }

    /// True for errors caused by caller misuse rather than the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            HeatMapError::Configuration { .. } | HeatMapError::Style(_)
        )
    }
}

impl From<std::io::Error> for HeatMapError {
    fn from(err: std::io::Error) -> Self {
        HeatMapError::Style(err.to_string())
    }
}

impl From<serde_json::Error> for HeatMapError {
    fn from(err: serde_json::Error) -> Self {
        HeatMapError::Style(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for HeatMapError {
    fn from(err: serde_yaml::Error) -> Self {
        HeatMapError::Style(format!("YAML error: {}", err))
    }
}
