//! Per-service sample logs
//!
//! Append-only JSON Lines log per service. The sampler appends each fetch;
//! the decision cycle reads back only a trailing window. Logs are compacted
//! once they exceed a bounded entry count, oldest lines first, so disk use
//! stays proportional to the retained history rather than the deployment's
//! age.

use crate::models::{MetricSample, MetricWindow};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default maximum entries retained per service log.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Keyed append-only storage for raw metric samples, one file per service.
#[derive(Debug, Clone)]
pub struct SampleLog {
    dir: PathBuf,
    max_entries: usize,
}

impl SampleLog {
    /// Open the log directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_max_entries(dir, DEFAULT_MAX_ENTRIES)
    }

    /// Open with a custom retention bound.
    pub fn with_max_entries(dir: impl Into<PathBuf>, max_entries: usize) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create sample log directory {:?}", dir))?;
        Ok(Self { dir, max_entries })
    }

    fn path_for(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", service))
    }

    /// Append samples to a service's log.
    pub fn append(&self, service: &str, samples: &[MetricSample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let path = self.path_for(service);
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("failed to open sample log {:?}", path))?;

        let mut buf = Vec::new();
        for sample in samples {
            serde_json::to_writer(&mut buf, sample).context("failed to serialize sample")?;
            buf.push(b'\n');
        }
        file.write_all(&buf).context("failed to append samples")?;

        debug!(service = %service, appended = samples.len(), "Samples appended");
        self.compact_if_needed(service, &path)
    }

    /// All retained samples for a service, oldest first. A missing log is
    /// an empty history, not an error.
    pub fn load(&self, service: &str) -> Result<Vec<MetricSample>> {
        let path = self.path_for(service);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read sample log {:?}", path))
            }
        };

        let mut samples = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<MetricSample>(line) {
                Ok(sample) => samples.push(sample),
                // A torn trailing line from a crash mid-append is dropped
                // rather than poisoning the whole history.
                Err(e) => warn!(service = %service, error = %e, "Skipping malformed sample line"),
            }
        }

        Ok(samples)
    }

    /// The trailing window for a service, bounded to `capacity` samples per
    /// metric.
    pub fn window(&self, service: &str, capacity: usize) -> Result<MetricWindow> {
        Ok(MetricWindow::from_samples(self.load(service)?, capacity))
    }

    /// Number of retained samples for a service.
    pub fn len(&self, service: &str) -> Result<usize> {
        Ok(self.load(service)?.len())
    }

    fn compact_if_needed(&self, service: &str, path: &Path) -> Result<()> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sample log {:?}", path))?;
        let lines: Vec<&str> = data.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() <= self.max_entries {
            return Ok(());
        }

        let keep = &lines[lines.len() - self.max_entries..];
        let temp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)
            .with_context(|| format!("failed to create temp file {:?}", temp_path))?;
        for line in keep {
            writeln!(file, "{}", line).context("failed to write compacted log")?;
        }
        file.sync_all().context("failed to sync compacted log")?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("failed to rename {:?} to {:?}", temp_path, path))?;

        debug!(
            service = %service,
            dropped = lines.len() - self.max_entries,
            "Sample log compacted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(metric: &str, timestamp: i64, value: f64) -> MetricSample {
        MetricSample {
            metric: metric.to_string(),
            timestamp,
            value,
        }
    }

    #[test]
    fn test_append_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::open(dir.path()).unwrap();

        log.append("auth", &[sample("cpu_pct", 1, 50.0), sample("cpu_pct", 2, 60.0)])
            .unwrap();
        log.append("auth", &[sample("mem_pct", 2, 30.0)]).unwrap();

        let samples = log.load("auth").unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].value, 50.0);
        assert_eq!(samples[2].metric, "mem_pct");
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::open(dir.path()).unwrap();

        assert!(log.load("unknown").unwrap().is_empty());
        assert!(log.window("unknown", 30).unwrap().is_empty());
    }

    #[test]
    fn test_window_keeps_trailing_samples() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::open(dir.path()).unwrap();

        let samples: Vec<_> = (0..50).map(|i| sample("cpu_pct", i, i as f64)).collect();
        log.append("auth", &samples).unwrap();

        let window = log.window("auth", 30).unwrap();
        assert_eq!(window.len(), 30);
        assert_eq!(window.values_for("cpu_pct")[0], 20.0);
    }

    #[test]
    fn test_compaction_bounds_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::with_max_entries(dir.path(), 10).unwrap();

        for batch in 0..5 {
            let samples: Vec<_> = (0..5)
                .map(|i| sample("cpu_pct", batch * 5 + i, (batch * 5 + i) as f64))
                .collect();
            log.append("auth", &samples).unwrap();
        }

        let samples = log.load("auth").unwrap();
        assert_eq!(samples.len(), 10);
        // Oldest entries were dropped, newest kept.
        assert_eq!(samples[0].value, 15.0);
        assert_eq!(samples[9].value, 24.0);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::open(dir.path()).unwrap();

        log.append("auth", &[sample("cpu_pct", 1, 50.0)]).unwrap();
        // Simulate a torn write.
        let path = dir.path().join("auth.jsonl");
        let mut data = std::fs::read_to_string(&path).unwrap();
        data.push_str("{\"metric\": \"cpu_pct\", \"time");
        std::fs::write(&path, data).unwrap();

        let samples = log.load("auth").unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_services_have_separate_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log = SampleLog::open(dir.path()).unwrap();

        log.append("auth", &[sample("cpu_pct", 1, 10.0)]).unwrap();
        log.append("bookings", &[sample("cpu_pct", 1, 90.0)]).unwrap();

        assert_eq!(log.len("auth").unwrap(), 1);
        assert_eq!(log.load("bookings").unwrap()[0].value, 90.0);
    }
}
