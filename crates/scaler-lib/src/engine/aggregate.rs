//! Window aggregation: one scalar per tracked metric

use crate::error::EngineError;
use crate::models::{AggregatedMetrics, MetricWindow};

/// Reduce a trailing window to the arithmetic mean of each tracked metric.
///
/// A window holding fewer samples than its capacity still aggregates over
/// what is present. A metric with no samples at all is an error: defaulting
/// it would silently push scoring toward low-bucket behavior.
pub fn aggregate<'a>(
    window: &MetricWindow,
    metrics: impl IntoIterator<Item = &'a str>,
) -> Result<AggregatedMetrics, EngineError> {
    let mut aggregated = AggregatedMetrics::new();

    for metric in metrics {
        let values = window.values_for(metric);
        if values.is_empty() {
            return Err(EngineError::MissingMetric {
                metric: metric.to_string(),
            });
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        aggregated.insert(metric.to_string(), mean);
    }

    Ok(aggregated)
}
