//! Daemon configuration

use anyhow::Result;
use serde::Deserialize;

/// Scaler daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerConfig {
    /// Kubernetes namespace the monitored workloads live in
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// API server port for health/metrics/decisions
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Metrics query service endpoint
    #[serde(default = "default_metrics_endpoint")]
    pub metrics_endpoint: String,

    /// Sample fetch interval in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Decision cycle interval in seconds
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_secs: u64,

    /// Trailing samples retained per metric when building windows
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Directory for sample logs and control state
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding catalog.json and per-service criteria definitions
    #[serde(default = "default_defs_dir")]
    pub defs_dir: String,

    /// Path to the executable that applies resource changes
    #[serde(default = "default_actuator_path")]
    pub actuator_path: String,

    /// Log decisions without invoking the actuator
    #[serde(default)]
    pub dry_run: bool,
}

fn default_namespace() -> String {
    std::env::var("SCALER_NAMESPACE").unwrap_or_else(|_| "default".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_metrics_endpoint() -> String {
    "http://metrics-query:9090".to_string()
}

fn default_sample_interval() -> u64 {
    300
}

fn default_cycle_interval() -> u64 {
    300
}

fn default_window_size() -> usize {
    30
}

fn default_data_dir() -> String {
    "/var/lib/utility-scaler".to_string()
}

fn default_defs_dir() -> String {
    "/etc/utility-scaler".to_string()
}

fn default_actuator_path() -> String {
    "/usr/local/bin/apply-resources.sh".to_string()
}

impl ScalerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SCALER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ScalerConfig {
            namespace: default_namespace(),
            api_port: default_api_port(),
            metrics_endpoint: default_metrics_endpoint(),
            sample_interval_secs: default_sample_interval(),
            cycle_interval_secs: default_cycle_interval(),
            window_size: default_window_size(),
            data_dir: default_data_dir(),
            defs_dir: default_defs_dir(),
            actuator_path: default_actuator_path(),
            dry_run: false,
        }))
    }
}
