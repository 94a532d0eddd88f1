//! Utility scoring over discrete metric buckets

use crate::catalog::ConfigurationCatalog;
use crate::criteria::{Bucket, UtilityCriterion};
use crate::error::EngineError;
use crate::models::{AggregatedMetrics, UtilityScoreSet};

/// Accumulate weighted preference scores for every candidate configuration.
///
/// Criteria are applied in list order; the sums are order-independent but a
/// deterministic pass keeps test output reproducible. Classification happens
/// once per criterion, then the preference table is indexed by
/// (bucket, configuration id).
pub fn score(
    aggregated: &AggregatedMetrics,
    criteria: &[UtilityCriterion],
    catalog: &ConfigurationCatalog,
) -> Result<UtilityScoreSet, EngineError> {
    let mut scores = UtilityScoreSet::new();

    // Every configuration id appearing in any preference table starts at
    // zero, and must be a catalog member.
    for criterion in criteria {
        for config_id in criterion.preferences.config_ids() {
            if !catalog.contains(config_id) {
                return Err(EngineError::UnknownConfiguration {
                    config_id: config_id.to_string(),
                });
            }
            scores.entry(config_id.to_string()).or_insert(0.0);
        }
    }

    for criterion in criteria {
        let value = aggregated.get(&criterion.metric).copied().ok_or_else(|| {
            EngineError::MissingMetric {
                metric: criterion.metric.clone(),
            }
        })?;

        let bucket = Bucket::classify(value, &criterion.thresholds);
        for (config_id, preference) in criterion.preferences.bucket(bucket) {
            if let Some(total) = scores.get_mut(config_id) {
                *total += criterion.weight * preference;
            }
        }
    }

    Ok(scores)
}
