//! Observability infrastructure for the autoscaler
//!
//! Provides:
//! - Prometheus metrics (cycle latency, decision counters, active config)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ScalerMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ScalerMetricsInner {
    cycle_duration_seconds: Histogram,
    evaluation_duration_seconds: Histogram,
    services_monitored: IntGauge,
    reconfigurations: IntGauge,
    holds: IntGauge,
    decision_errors: IntGauge,
    actuation_failures: IntGauge,
    sample_fetch_errors: IntGauge,
    active_config_info: GaugeVec,
}

impl ScalerMetricsInner {
    fn new() -> Self {
        Self {
            cycle_duration_seconds: register_histogram!(
                "utility_scaler_cycle_duration_seconds",
                "Time spent running one full decision cycle across all services",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_duration_seconds"),

            evaluation_duration_seconds: register_histogram!(
                "utility_scaler_evaluation_duration_seconds",
                "Time spent evaluating a single service's decision",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register evaluation_duration_seconds"),

            services_monitored: register_int_gauge!(
                "utility_scaler_services_monitored",
                "Number of services currently evaluated each cycle"
            )
            .expect("Failed to register services_monitored"),

            reconfigurations: register_int_gauge!(
                "utility_scaler_reconfigurations_total",
                "Total number of reconfiguration requests emitted"
            )
            .expect("Failed to register reconfigurations_total"),

            holds: register_int_gauge!(
                "utility_scaler_holds_total",
                "Total number of cycles that held the active configuration"
            )
            .expect("Failed to register holds_total"),

            decision_errors: register_int_gauge!(
                "utility_scaler_decision_errors_total",
                "Total number of per-service decision failures"
            )
            .expect("Failed to register decision_errors_total"),

            actuation_failures: register_int_gauge!(
                "utility_scaler_actuation_failures_total",
                "Total number of failed actuator invocations"
            )
            .expect("Failed to register actuation_failures_total"),

            sample_fetch_errors: register_int_gauge!(
                "utility_scaler_sample_fetch_errors_total",
                "Total number of failed sample fetches"
            )
            .expect("Failed to register sample_fetch_errors_total"),

            active_config_info: register_gauge_vec!(
                "utility_scaler_active_config_info",
                "Currently active configuration per service",
                &["service", "config"]
            )
            .expect("Failed to register active_config_info"),
        }
    }
}

/// Scaler metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ScalerMetrics {
    _private: (),
}

impl Default for ScalerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ScalerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ScalerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record the duration of one full decision cycle
    pub fn observe_cycle_duration(&self, duration_secs: f64) {
        self.inner().cycle_duration_seconds.observe(duration_secs);
    }

    /// Record the duration of a single service evaluation
    pub fn observe_evaluation_duration(&self, duration_secs: f64) {
        self.inner()
            .evaluation_duration_seconds
            .observe(duration_secs);
    }

    /// Update the monitored service count
    pub fn set_services_monitored(&self, count: i64) {
        self.inner().services_monitored.set(count);
    }

    /// Increment the reconfiguration counter
    pub fn inc_reconfigurations(&self) {
        self.inner().reconfigurations.inc();
    }

    /// Increment the hold counter
    pub fn inc_holds(&self) {
        self.inner().holds.inc();
    }

    /// Increment the decision error counter
    pub fn inc_decision_errors(&self) {
        self.inner().decision_errors.inc();
    }

    /// Increment the actuation failure counter
    pub fn inc_actuation_failures(&self) {
        self.inner().actuation_failures.inc();
    }

    /// Increment the sample fetch error counter
    pub fn inc_sample_fetch_errors(&self) {
        self.inner().sample_fetch_errors.inc();
    }

    /// Record the active configuration for a service, clearing the previous
    /// label pair when the configuration changed.
    pub fn set_active_config(&self, service: &str, config: &str, previous: Option<&str>) {
        let gauge = &self.inner().active_config_info;
        if let Some(previous) = previous {
            if previous != config {
                let _ = gauge.remove_label_values(&[service, previous]);
            }
        }
        gauge.with_label_values(&[service, config]).set(1.0);
    }
}

/// Structured logger for decision events
///
/// Provides consistent JSON-formatted logging for decisions, cycle errors,
/// and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    namespace: String,
}

impl StructuredLogger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Log an emitted reconfiguration request
    pub fn log_reconfigure(
        &self,
        service: &str,
        config_id: &str,
        score: f64,
        cpu_request_millicores: u32,
        cpu_limit_millicores: u32,
        memory_request_bytes: u64,
        memory_limit_bytes: u64,
        replicas: u32,
    ) {
        info!(
            event = "reconfigure_requested",
            namespace = %self.namespace,
            service = %service,
            config = %config_id,
            score = score,
            cpu_request_millicores = cpu_request_millicores,
            cpu_limit_millicores = cpu_limit_millicores,
            memory_request_bytes = memory_request_bytes,
            memory_limit_bytes = memory_limit_bytes,
            replicas = replicas,
            "Switching configuration"
        );
    }

    /// Log a cycle that kept the active configuration
    pub fn log_hold(&self, service: &str, candidate: &str, current: &str, settling: bool) {
        info!(
            event = "configuration_held",
            namespace = %self.namespace,
            service = %service,
            candidate = %candidate,
            current = %current,
            settling = settling,
            "No update needed in this cycle"
        );
    }

    /// Log a failed service decision
    pub fn log_decision_error(&self, service: &str, kind: &str, error: &str) {
        warn!(
            event = "decision_failed",
            namespace = %self.namespace,
            service = %service,
            kind = %kind,
            error = %error,
            "Skipping service for this cycle"
        );
    }

    /// Log a failed actuator invocation
    pub fn log_actuation_failure(&self, service: &str, config_id: &str, error: &str) {
        warn!(
            event = "actuation_failed",
            namespace = %self.namespace,
            service = %service,
            config = %config_id,
            error = %error,
            "Actuator invocation failed"
        );
    }

    /// Log daemon startup
    pub fn log_startup(&self, version: &str, services: usize) {
        info!(
            event = "scaler_started",
            namespace = %self.namespace,
            version = %version,
            services = services,
            "Utility scaler started"
        );
    }

    /// Log daemon shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "scaler_shutdown",
            namespace = %self.namespace,
            reason = %reason,
            "Utility scaler shutting down"
        );
    }
}
