//! Core data models for the decision engine

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One utilization sample for a single metric of a service.
///
/// Produced by the metrics source; never mutated after collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub metric: String,
    pub timestamp: i64,
    pub value: f64,
}

/// Aggregated metric scalars for one evaluation, keyed by metric name.
///
/// Derived from a window each cycle and discarded afterwards.
pub type AggregatedMetrics = HashMap<String, f64>;

/// Accumulated utility score per configuration id for one evaluation.
///
/// A `BTreeMap` keeps iteration in id order, which the selector relies on
/// for its deterministic tie-break.
pub type UtilityScoreSet = BTreeMap<String, f64>;

/// Trailing window of samples for one service.
///
/// Retains at most `capacity` samples per metric; pushing beyond that
/// discards the oldest samples for that metric. Samples stay in insertion
/// (timestamp) order.
#[derive(Debug, Clone)]
pub struct MetricWindow {
    capacity: usize,
    samples: Vec<MetricSample>,
}

impl MetricWindow {
    /// Create an empty window retaining `capacity` samples per metric.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: Vec::new(),
        }
    }

    /// Build a window from samples ordered oldest-first, keeping only the
    /// trailing `capacity` per metric.
    pub fn from_samples(samples: Vec<MetricSample>, capacity: usize) -> Self {
        let mut window = Self { capacity, samples };
        window.trim();
        window
    }

    /// Append a sample, evicting the oldest sample of the same metric when
    /// the window is full.
    pub fn push(&mut self, sample: MetricSample) {
        self.samples.push(sample);
        self.trim();
    }

    fn trim(&mut self) {
        let mut kept_per_metric: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<MetricSample> = Vec::with_capacity(self.samples.len());

        // Walk newest-first so the most recent `capacity` of each metric survive.
        for sample in self.samples.drain(..).rev() {
            let count = kept_per_metric.entry(sample.metric.clone()).or_insert(0);
            if *count < self.capacity {
                *count += 1;
                kept.push(sample);
            }
        }

        kept.reverse();
        self.samples = kept;
    }

    /// All sample values for one metric, oldest first.
    pub fn values_for(&self, metric: &str) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|s| s.metric == metric)
            .map(|s| s.value)
            .collect()
    }

    /// Whether the window holds at least one sample for `metric`.
    pub fn contains_metric(&self, metric: &str) -> bool {
        self.samples.iter().any(|s| s.metric == metric)
    }

    /// All retained samples, oldest first.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Concrete resource shape for one catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub cpu_request_millicores: u32,
    pub cpu_limit_millicores: u32,
    pub memory_request_bytes: u64,
    pub memory_limit_bytes: u64,
    pub replicas: u32,
}

/// Per-service decision state that survives across cycles.
///
/// Owned exclusively by the hysteresis machine; read at the start of a
/// service's evaluation and written back once at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub current_config: String,
    pub previous_config: String,
}

impl ControlState {
    /// Fresh state with both fields set to one legal configuration id.
    pub fn initial(config_id: impl Into<String>) -> Self {
        let id = config_id.into();
        Self {
            current_config: id.clone(),
            previous_config: id,
        }
    }

    /// True while a change applied last cycle is still settling.
    pub fn is_settling(&self) -> bool {
        self.current_config != self.previous_config
    }
}

/// Request handed to the actuator when the hysteresis machine fires.
///
/// The engine does not verify that actuation succeeded; retry and rollback
/// belong to the actuator's side of the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconfigureRequest {
    pub service: String,
    pub namespace: String,
    pub config_id: String,
    pub resources: ResourceConfig,
}
