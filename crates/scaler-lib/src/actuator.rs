//! Reconfiguration actuation
//!
//! The actuator mutates a live workload's resource shape. From the engine's
//! perspective the call is fire-and-forget: a failed actuation is logged and
//! counted, never retried within the cycle, and never fed back into the
//! decision.

use crate::models::ReconfigureRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Trait for reconfiguration executors.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Apply the resolved resource shape to the target workload.
    async fn apply(&self, request: &ReconfigureRequest) -> Result<()>;
}

/// Invokes an external executable with the resolved parameters.
///
/// Argument order matches the conventional patch script interface:
/// cpu request, cpu limit, memory request, memory limit, workload name,
/// namespace, replica count.
pub struct CommandActuator {
    program: PathBuf,
}

impl CommandActuator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Build the argument vector for the external executable.
fn command_args(request: &ReconfigureRequest) -> Vec<String> {
    const MIB: u64 = 1024 * 1024;
    let r = &request.resources;
    vec![
        format!("{}m", r.cpu_request_millicores),
        format!("{}m", r.cpu_limit_millicores),
        format!("{}Mi", r.memory_request_bytes / MIB),
        format!("{}Mi", r.memory_limit_bytes / MIB),
        request.service.clone(),
        request.namespace.clone(),
        r.replicas.to_string(),
    ]
}

#[async_trait]
impl Actuator for CommandActuator {
    async fn apply(&self, request: &ReconfigureRequest) -> Result<()> {
        let status = tokio::process::Command::new(&self.program)
            .args(command_args(request))
            .status()
            .await
            .with_context(|| format!("failed to launch actuator {:?}", self.program))?;

        if !status.success() {
            anyhow::bail!("actuator exited with {}", status);
        }

        info!(
            event = "reconfigure_applied",
            service = %request.service,
            namespace = %request.namespace,
            config = %request.config_id,
            "Reconfiguration applied"
        );
        Ok(())
    }
}

/// Logs the request without touching the cluster (dry-run mode).
pub struct LogOnlyActuator;

#[async_trait]
impl Actuator for LogOnlyActuator {
    async fn apply(&self, request: &ReconfigureRequest) -> Result<()> {
        let r = &request.resources;
        info!(
            event = "reconfigure_dry_run",
            service = %request.service,
            namespace = %request.namespace,
            config = %request.config_id,
            cpu_request_millicores = r.cpu_request_millicores,
            cpu_limit_millicores = r.cpu_limit_millicores,
            memory_request_bytes = r.memory_request_bytes,
            memory_limit_bytes = r.memory_limit_bytes,
            replicas = r.replicas,
            "Dry-run: reconfiguration not applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceConfig;

    fn request() -> ReconfigureRequest {
        ReconfigureRequest {
            service: "bookings".to_string(),
            namespace: "acmeair".to_string(),
            config_id: "C2".to_string(),
            resources: ResourceConfig {
                cpu_request_millicores: 400,
                cpu_limit_millicores: 600,
                memory_request_bytes: 300 * 1024 * 1024,
                memory_limit_bytes: 500 * 1024 * 1024,
                replicas: 1,
            },
        }
    }

    #[test]
    fn test_command_args_formatting() {
        let args = command_args(&request());
        assert_eq!(
            args,
            vec!["400m", "600m", "300Mi", "500Mi", "bookings", "acmeair", "1"]
        );
    }

    #[tokio::test]
    async fn test_log_only_actuator_always_succeeds() {
        let actuator = LogOnlyActuator;
        assert!(actuator.apply(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_command_actuator_missing_program_fails() {
        let actuator = CommandActuator::new("/nonexistent/actuator");
        assert!(actuator.apply(&request()).await.is_err());
    }
}
