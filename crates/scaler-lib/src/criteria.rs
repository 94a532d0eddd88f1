//! Utility criteria: weighted, bucketed preferences over aggregated metrics
//!
//! Criteria are static, versioned definitions loaded per service from JSON
//! files, one directory per service under the definitions root. The engine
//! treats them as read-only inputs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Discrete utilization bucket for an aggregated metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Bucket {
    /// Classify a value against an ascending threshold triple.
    ///
    /// Boundaries are inclusive on the lower side: a value equal to a
    /// threshold falls into the lower bucket. Every real value maps to
    /// exactly one bucket.
    pub fn classify(value: f64, thresholds: &[f64; 3]) -> Self {
        if value > thresholds[2] {
            Bucket::VeryHigh
        } else if value > thresholds[1] {
            Bucket::High
        } else if value > thresholds[0] {
            Bucket::Medium
        } else {
            Bucket::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Low => "low",
            Bucket::Medium => "medium",
            Bucket::High => "high",
            Bucket::VeryHigh => "very_high",
        }
    }
}

/// Per-bucket preference contributions keyed by configuration id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceTable {
    pub low: BTreeMap<String, f64>,
    pub medium: BTreeMap<String, f64>,
    pub high: BTreeMap<String, f64>,
    pub very_high: BTreeMap<String, f64>,
}

impl PreferenceTable {
    /// The contribution map for one bucket.
    pub fn bucket(&self, bucket: Bucket) -> &BTreeMap<String, f64> {
        match bucket {
            Bucket::Low => &self.low,
            Bucket::Medium => &self.medium,
            Bucket::High => &self.high,
            Bucket::VeryHigh => &self.very_high,
        }
    }

    /// Union of configuration ids across all four buckets.
    pub fn config_ids(&self) -> BTreeSet<&str> {
        [&self.low, &self.medium, &self.high, &self.very_high]
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
            .collect()
    }
}

/// One scoring criterion for a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityCriterion {
    pub metric: String,
    pub weight: f64,
    pub thresholds: [f64; 3],
    pub preferences: PreferenceTable,
}

impl UtilityCriterion {
    /// Structural validation: thresholds must be non-decreasing and the
    /// weight finite and non-negative. A zero weight is legal.
    pub fn validate(&self) -> Result<()> {
        if self.thresholds[0] > self.thresholds[1] || self.thresholds[1] > self.thresholds[2] {
            anyhow::bail!(
                "criterion '{}' has non-ascending thresholds {:?}",
                self.metric,
                self.thresholds
            );
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            anyhow::bail!("criterion '{}' has invalid weight {}", self.metric, self.weight);
        }
        if self.preferences.config_ids().is_empty() {
            anyhow::bail!("criterion '{}' has an empty preference table", self.metric);
        }
        Ok(())
    }
}

/// Metric names referenced by a criteria list, deduplicated.
pub fn referenced_metrics(criteria: &[UtilityCriterion]) -> BTreeSet<&str> {
    criteria.iter().map(|c| c.metric.as_str()).collect()
}

/// Load and validate the ordered criteria list for one service.
pub fn load_criteria(path: &Path) -> Result<Vec<UtilityCriterion>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read criteria file {:?}", path))?;
    let criteria: Vec<UtilityCriterion> = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse criteria file {:?}", path))?;
    if criteria.is_empty() {
        anyhow::bail!("criteria file {:?} defines no criteria", path);
    }
    for criterion in &criteria {
        criterion
            .validate()
            .with_context(|| format!("invalid criterion in {:?}", path))?;
    }
    Ok(criteria)
}

/// Discover monitored services by scanning the definitions root.
///
/// Every subdirectory containing a `criteria.json` is one service; the
/// returned names are sorted for a deterministic evaluation order.
pub fn discover_services(defs_dir: &Path) -> Result<Vec<String>> {
    let mut services = Vec::new();
    let entries = std::fs::read_dir(defs_dir)
        .with_context(|| format!("failed to read definitions directory {:?}", defs_dir))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join("criteria.json").is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                services.push(name.to_string());
            }
        }
    }

    services.sort();
    Ok(services)
}
