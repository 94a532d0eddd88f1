//! The decision cycle loop
//!
//! One cycle evaluates every monitored service sequentially: read the
//! trailing window, run the decision engine against the persisted control
//! state, write the state back, and hand any reconfiguration request to the
//! actuator. Services share no mutable state, so a failure for one is
//! logged and the cycle moves on to the next.

use crate::actuator::Actuator;
use crate::catalog::ConfigurationCatalog;
use crate::criteria::UtilityCriterion;
use crate::engine::{self, ServiceTarget};
use crate::error::EngineError;
use crate::models::UtilityScoreSet;
use crate::observability::{ScalerMetrics, StructuredLogger};
use crate::store::{ControlStateStore, SampleLog};
use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::{debug, info};

/// Static per-service scoring definition resolved at startup.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub target: ServiceTarget,
    pub criteria: Vec<UtilityCriterion>,
}

/// What a cycle did for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Reconfigured,
    Held,
}

/// Serializable record of the most recent evaluation for one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub service: String,
    pub namespace: String,
    pub candidate: String,
    pub action: DecisionAction,
    pub current_config: String,
    pub previous_config: String,
    pub scores: UtilityScoreSet,
    pub evaluated_at: i64,
}

/// Shared map of the latest decision per service, read by the HTTP API.
pub type DecisionBoard = Arc<DashMap<String, DecisionRecord>>;

/// Configuration for the decision cycle loop
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    /// Interval between cycles (default: 5 minutes)
    pub cycle_interval: Duration,
    /// Trailing samples retained per metric when building windows
    pub window_size: usize,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(5 * 60),
            window_size: 30,
        }
    }
}

/// Results from one decision cycle
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleResults {
    pub evaluated: usize,
    pub reconfigured: usize,
    pub held: usize,
    pub failed: usize,
}

/// Decision cycle loop across all monitored services
pub struct ControlLoop {
    specs: Vec<ServiceSpec>,
    catalog: ConfigurationCatalog,
    samples: Arc<SampleLog>,
    states: ControlStateStore,
    actuator: Arc<dyn Actuator>,
    config: ControlLoopConfig,
    decisions: DecisionBoard,
    metrics: ScalerMetrics,
    logger: StructuredLogger,
}

impl ControlLoop {
    /// Handle to the shared decision board.
    pub fn decisions(&self) -> DecisionBoard {
        self.decisions.clone()
    }

    /// Run the cycle loop until shutdown is signalled.
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.cycle_interval.as_secs(),
            services = self.specs.len(),
            "Starting decision cycle loop"
        );
        self.metrics.set_services_monitored(self.specs.len() as i64);

        let mut ticker = interval(self.config.cycle_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    let results = self.run_cycle().await;
                    self.metrics.observe_cycle_duration(start.elapsed().as_secs_f64());
                    debug!(
                        evaluated = results.evaluated,
                        reconfigured = results.reconfigured,
                        held = results.held,
                        failed = results.failed,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Decision cycle complete"
                    );
                }
                _ = shutdown.recv() => {
                    info!("Shutting down decision cycle loop");
                    break;
                }
            }
        }
    }

    /// Run one decision cycle across every service.
    pub async fn run_cycle(&self) -> CycleResults {
        let mut results = CycleResults::default();

        for spec in &self.specs {
            results.evaluated += 1;
            match self.evaluate_service(spec).await {
                Ok(DecisionAction::Reconfigured) => results.reconfigured += 1,
                Ok(DecisionAction::Held) => results.held += 1,
                Err(e) => {
                    results.failed += 1;
                    self.metrics.inc_decision_errors();
                    let kind = e
                        .downcast_ref::<EngineError>()
                        .map(EngineError::kind)
                        .unwrap_or("io");
                    self.logger
                        .log_decision_error(&spec.target.service, kind, &format!("{e:#}"));
                }
            }
        }

        results
    }

    /// Evaluate one service: window → engine → persist → actuate.
    async fn evaluate_service(&self, spec: &ServiceSpec) -> Result<DecisionAction> {
        let service = &spec.target.service;
        let start = Instant::now();

        let window = self.samples.window(service, self.config.window_size)?;

        let default_id = self
            .catalog
            .first_id()
            .ok_or_else(|| anyhow::anyhow!("configuration catalog is empty"))?;
        let mut state = self.states.load_or_init(service, default_id)?;
        self.validate_state(service, &state)?;

        let previous_active = state.current_config.clone();
        let was_settling = state.is_settling();
        let evaluation =
            engine::evaluate(&spec.target, &window, &spec.criteria, &self.catalog, &mut state)?;

        // Persist exactly once per cycle, before actuation: the decision
        // stands even if the actuator fails.
        self.states.save(service, &state)?;

        let action = match &evaluation.request {
            Some(request) => {
                let r = &request.resources;
                self.logger.log_reconfigure(
                    service,
                    &request.config_id,
                    evaluation.scores.get(&evaluation.candidate).copied().unwrap_or(0.0),
                    r.cpu_request_millicores,
                    r.cpu_limit_millicores,
                    r.memory_request_bytes,
                    r.memory_limit_bytes,
                    r.replicas,
                );
                self.metrics.inc_reconfigurations();

                if let Err(e) = self.actuator.apply(request).await {
                    self.metrics.inc_actuation_failures();
                    self.logger
                        .log_actuation_failure(service, &request.config_id, &format!("{e:#}"));
                }

                DecisionAction::Reconfigured
            }
            None => {
                self.logger.log_hold(
                    service,
                    &evaluation.candidate,
                    &state.current_config,
                    was_settling,
                );
                self.metrics.inc_holds();
                DecisionAction::Held
            }
        };

        self.metrics
            .set_active_config(service, &state.current_config, Some(&previous_active));
        self.metrics
            .observe_evaluation_duration(start.elapsed().as_secs_f64());

        self.decisions.insert(
            service.clone(),
            DecisionRecord {
                service: service.clone(),
                namespace: spec.target.namespace.clone(),
                candidate: evaluation.candidate,
                action,
                current_config: state.current_config.clone(),
                previous_config: state.previous_config.clone(),
                scores: evaluation.scores,
                evaluated_at: chrono::Utc::now().timestamp(),
            },
        );

        Ok(action)
    }

    /// Persisted state must reference catalog members only.
    fn validate_state(
        &self,
        service: &str,
        state: &crate::models::ControlState,
    ) -> Result<(), EngineError> {
        for id in [&state.current_config, &state.previous_config] {
            if !self.catalog.contains(id) {
                return Err(EngineError::InvalidPersistedState {
                    service: service.to_string(),
                    reason: format!("references unknown configuration id '{}'", id),
                });
            }
        }
        Ok(())
    }
}

/// Builder for the decision cycle loop
pub struct ControlLoopBuilder {
    specs: Vec<ServiceSpec>,
    catalog: Option<ConfigurationCatalog>,
    samples: Option<Arc<SampleLog>>,
    states: Option<ControlStateStore>,
    actuator: Option<Arc<dyn Actuator>>,
    config: ControlLoopConfig,
    namespace: String,
}

impl ControlLoopBuilder {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            catalog: None,
            samples: None,
            states: None,
            actuator: None,
            config: ControlLoopConfig::default(),
            namespace: "default".to_string(),
        }
    }

    pub fn specs(mut self, specs: Vec<ServiceSpec>) -> Self {
        self.specs = specs;
        self
    }

    pub fn catalog(mut self, catalog: ConfigurationCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn samples(mut self, samples: Arc<SampleLog>) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn states(mut self, states: ControlStateStore) -> Self {
        self.states = Some(states);
        self
    }

    pub fn actuator(mut self, actuator: Arc<dyn Actuator>) -> Self {
        self.actuator = Some(actuator);
        self
    }

    pub fn cycle_interval(mut self, interval: Duration) -> Self {
        self.config.cycle_interval = interval;
        self
    }

    pub fn window_size(mut self, window_size: usize) -> Self {
        self.config.window_size = window_size;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn build(self) -> Result<ControlLoop> {
        let catalog = self
            .catalog
            .ok_or_else(|| anyhow::anyhow!("Catalog is required"))?;
        let samples = self
            .samples
            .ok_or_else(|| anyhow::anyhow!("Sample log is required"))?;
        let states = self
            .states
            .ok_or_else(|| anyhow::anyhow!("State store is required"))?;
        let actuator = self
            .actuator
            .ok_or_else(|| anyhow::anyhow!("Actuator is required"))?;

        Ok(ControlLoop {
            specs: self.specs,
            catalog,
            samples,
            states,
            actuator,
            config: self.config,
            decisions: Arc::new(DashMap::new()),
            metrics: ScalerMetrics::new(),
            logger: StructuredLogger::new(self.namespace),
        })
    }
}

impl Default for ControlLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
