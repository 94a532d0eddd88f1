//! Sample collection loop
//!
//! Periodically queries the metrics source for every monitored service and
//! appends the fetched rows to the per-service sample logs. A fetch failure
//! for one service never blocks the rest.

use crate::engine::ServiceTarget;
use crate::observability::ScalerMetrics;
use crate::source::MetricsSource;
use crate::store::SampleLog;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::{debug, info, warn};

/// Configuration for the sample collection loop
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Interval between fetches (default: 5 minutes, one fetch per cycle)
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Collection loop that fetches samples for all monitored services
pub struct SamplerLoop {
    source: Arc<dyn MetricsSource>,
    log: Arc<SampleLog>,
    targets: Vec<ServiceTarget>,
    config: SamplerConfig,
    metrics: ScalerMetrics,
}

impl SamplerLoop {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        log: Arc<SampleLog>,
        targets: Vec<ServiceTarget>,
        config: SamplerConfig,
    ) -> Self {
        Self {
            source,
            log,
            targets,
            config,
            metrics: ScalerMetrics::new(),
        }
    }

    /// Run the collection loop until shutdown is signalled.
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            services = self.targets.len(),
            "Starting sample collection loop"
        );

        let mut ticker = interval(self.config.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    let results = self.fetch_all().await;
                    debug!(
                        fetched = results.success_count,
                        errors = results.error_count,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Sample fetch pass complete"
                    );
                }
                _ = shutdown.recv() => {
                    info!("Shutting down sample collection loop");
                    break;
                }
            }
        }
    }

    /// Fetch and persist samples for every target.
    pub async fn fetch_all(&self) -> FetchResults {
        let mut results = FetchResults::default();

        for target in &self.targets {
            match self.fetch_target(target).await {
                Ok(count) => {
                    results.success_count += 1;
                    debug!(service = %target.service, samples = count, "Samples fetched");
                }
                Err(e) => {
                    results.error_count += 1;
                    self.metrics.inc_sample_fetch_errors();
                    warn!(
                        service = %target.service,
                        error = %e,
                        "Failed to fetch samples"
                    );
                }
            }
        }

        results
    }

    async fn fetch_target(&self, target: &ServiceTarget) -> Result<usize> {
        let samples = self
            .source
            .fetch(&target.service, &target.namespace)
            .await?;
        self.log.append(&target.service, &samples)?;
        Ok(samples.len())
    }
}

/// Results from one fetch pass
#[derive(Debug, Default)]
pub struct FetchResults {
    pub success_count: usize,
    pub error_count: usize,
}

/// Builder for the sample collection loop
pub struct SamplerLoopBuilder {
    source: Option<Arc<dyn MetricsSource>>,
    log: Option<Arc<SampleLog>>,
    targets: Vec<ServiceTarget>,
    config: SamplerConfig,
}

impl SamplerLoopBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            log: None,
            targets: Vec::new(),
            config: SamplerConfig::default(),
        }
    }

    pub fn source(mut self, source: Arc<dyn MetricsSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn log(mut self, log: Arc<SampleLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn targets(mut self, targets: Vec<ServiceTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn build(self) -> Result<SamplerLoop> {
        let source = self
            .source
            .ok_or_else(|| anyhow::anyhow!("Metrics source is required"))?;
        let log = self
            .log
            .ok_or_else(|| anyhow::anyhow!("Sample log is required"))?;

        Ok(SamplerLoop::new(source, log, self.targets, self.config))
    }
}

impl Default for SamplerLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricSample;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock source for testing
    struct MockSource {
        call_count: AtomicUsize,
        fail_for: Option<String>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_for: None,
            }
        }

        fn failing_for(service: &str) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_for: Some(service.to_string()),
            }
        }
    }

    #[async_trait]
    impl MetricsSource for MockSource {
        async fn fetch(&self, service: &str, _namespace: &str) -> Result<Vec<MetricSample>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.fail_for.as_deref() == Some(service) {
                anyhow::bail!("backend unavailable");
            }

            Ok(vec![MetricSample {
                metric: "cpu_pct".to_string(),
                timestamp: 1700000000,
                value: 55.0,
            }])
        }
    }

    fn targets(names: &[&str]) -> Vec<ServiceTarget> {
        names
            .iter()
            .map(|n| ServiceTarget::new(*n, "acmeair"))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_appends_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(SampleLog::open(dir.path()).unwrap());
        let source = Arc::new(MockSource::new());

        let sampler = SamplerLoop::new(
            source.clone(),
            log.clone(),
            targets(&["auth", "bookings"]),
            SamplerConfig::default(),
        );

        let results = sampler.fetch_all().await;
        assert_eq!(results.success_count, 2);
        assert_eq!(results.error_count, 0);
        assert_eq!(source.call_count.load(Ordering::SeqCst), 2);
        assert_eq!(log.len("auth").unwrap(), 1);
        assert_eq!(log.len("bookings").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(SampleLog::open(dir.path()).unwrap());
        let source = Arc::new(MockSource::failing_for("auth"));

        let sampler = SamplerLoop::new(
            source,
            log.clone(),
            targets(&["auth", "bookings"]),
            SamplerConfig::default(),
        );

        let results = sampler.fetch_all().await;
        assert_eq!(results.success_count, 1);
        assert_eq!(results.error_count, 1);
        assert_eq!(log.len("auth").unwrap(), 0);
        assert_eq!(log.len("bookings").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_builder_requires_source_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(SampleLog::open(dir.path()).unwrap());

        assert!(SamplerLoopBuilder::new().log(log.clone()).build().is_err());
        assert!(SamplerLoopBuilder::new()
            .source(Arc::new(MockSource::new()))
            .build()
            .is_err());
        assert!(SamplerLoopBuilder::new()
            .source(Arc::new(MockSource::new()))
            .log(log)
            .interval(Duration::from_secs(60))
            .build()
            .is_ok());
    }
}
