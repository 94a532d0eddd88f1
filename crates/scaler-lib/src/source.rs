//! Metric sample acquisition
//!
//! The time-series query service is an external collaborator; this module
//! defines the boundary trait and an HTTP client implementation that asks
//! the backend for a workload's trailing samples.

use crate::models::MetricSample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Trait for metric sample providers.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the trailing samples for one workload.
    async fn fetch(&self, service: &str, namespace: &str) -> Result<Vec<MetricSample>>;
}

/// Query parameters for the metrics backend.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the query service.
    pub endpoint: String,
    /// Trailing window to request, in seconds.
    pub lookback_secs: u64,
    /// Sampling resolution, in seconds.
    pub sampling_secs: u64,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://metrics-query:9090".to_string(),
            lookback_secs: 300,
            sampling_secs: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Row shape returned by the query service.
#[derive(Debug, Deserialize)]
struct SampleRow {
    metric: String,
    timestamp: i64,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct SampleResponse {
    rows: Vec<SampleRow>,
}

/// HTTP client for the time-series query service.
pub struct HttpMetricsSource {
    client: reqwest::Client,
    base_url: Url,
    lookback_secs: u64,
    sampling_secs: u64,
}

impl HttpMetricsSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to create HTTP client")?;
        let base_url = Url::parse(&config.endpoint).context("invalid metrics endpoint URL")?;

        Ok(Self {
            client,
            base_url,
            lookback_secs: config.lookback_secs,
            sampling_secs: config.sampling_secs,
        })
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self, service: &str, namespace: &str) -> Result<Vec<MetricSample>> {
        let url = self
            .base_url
            .join("api/v1/samples")
            .context("invalid samples path")?;

        let start = format!("-{}", self.lookback_secs);
        let sampling = self.sampling_secs.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("workload", service),
                ("namespace", namespace),
                ("start", start.as_str()),
                ("sampling", sampling.as_str()),
            ])
            .send()
            .await
            .context("failed to query metrics backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("metrics backend error ({}): {}", status, body);
        }

        let payload: SampleResponse = response
            .json()
            .await
            .context("failed to parse metrics response")?;

        Ok(payload
            .rows
            .into_iter()
            .map(|row| MetricSample {
                metric: row.metric,
                timestamp: row.timestamp,
                value: row.value,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_config_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.lookback_secs, 300);
        assert_eq!(config.sampling_secs, 10);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "rows": [
                {"metric": "cpu_pct", "timestamp": 1700000000, "value": 42.5},
                {"metric": "mem_pct", "timestamp": 1700000000, "value": 61.0}
            ]
        }"#;

        let payload: SampleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.rows.len(), 2);
        assert_eq!(payload.rows[0].metric, "cpu_pct");
        assert_eq!(payload.rows[1].value, 61.0);
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = SourceConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(HttpMetricsSource::new(config).is_err());
    }
}
