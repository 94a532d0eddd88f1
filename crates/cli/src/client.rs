//! API client for communicating with the scaler daemon

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// API client for the scaler daemon
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        // Health endpoints answer 503 with a JSON body worth showing.
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonHealth {
    pub status: String,
    pub components: HashMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonReadiness {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub service: String,
    pub namespace: String,
    pub candidate: String,
    pub action: String,
    pub current_config: String,
    pub previous_config: String,
    pub scores: BTreeMap<String, f64>,
    pub evaluated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_decisions_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/decisions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{
                    "service": "bookings",
                    "namespace": "acmeair",
                    "candidate": "C2",
                    "action": "reconfigured",
                    "current_config": "C2",
                    "previous_config": "C1",
                    "scores": {"C1": 0.0, "C2": 2.0},
                    "evaluated_at": 1700000000
                }]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let records: Vec<DecisionRecord> = client.get("decisions").await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].service, "bookings");
        assert_eq!(records[0].action, "reconfigured");
        assert_eq!(records[0].scores["C2"], 2.0);
    }

    #[tokio::test]
    async fn test_unhealthy_body_is_still_parsed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "unhealthy", "components": {}}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health: DaemonHealth = client.get("healthz").await.unwrap();

        assert_eq!(health.status, "unhealthy");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/decisions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result: Result<Vec<DecisionRecord>> = client.get("decisions").await;

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
