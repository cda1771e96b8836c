//! Configuration for tracing and instrumentation

use serde::{Deserialize, Serialize};

/// Main instrumentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Service name attached to the root span
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "debug", "starlight=trace")
    pub log_level: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            service_name: "starlight".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}
