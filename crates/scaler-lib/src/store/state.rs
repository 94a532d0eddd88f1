//! Persisted per-service control state
//!
//! One JSON record per service under the state directory, holding exactly
//! {current_config, previous_config}. The record is read at the start of a
//! service's evaluation and written back atomically (temp file + rename)
//! at the end, so a crash mid-write never leaves a torn record.

use crate::error::EngineError;
use crate::models::ControlState;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Keyed store for control state records, one file per service.
#[derive(Debug, Clone)]
pub struct ControlStateStore {
    dir: PathBuf,
}

impl ControlStateStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create state directory {:?}", dir))?;
        Ok(Self { dir })
    }

    fn path_for(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.json", service))
    }

    /// Load a service's state, initializing (and persisting) a fresh record
    /// with both fields set to `default_config` when none exists yet.
    ///
    /// A record that exists but cannot be parsed, or that carries empty
    /// fields, is surfaced as `InvalidPersistedState` — never repaired
    /// silently, since guessing could resize a live workload.
    pub fn load_or_init(
        &self,
        service: &str,
        default_config: &str,
    ) -> Result<ControlState, EngineError> {
        let path = self.path_for(service);

        if !path.exists() {
            let state = ControlState::initial(default_config);
            self.save(service, &state)
                .map_err(|e| self.invalid(service, format!("failed to initialize: {e}")))?;
            info!(
                service = %service,
                config = %default_config,
                "Initialized control state"
            );
            return Ok(state);
        }

        let data = std::fs::read_to_string(&path)
            .map_err(|e| self.invalid(service, format!("unreadable: {e}")))?;
        let state: ControlState = serde_json::from_str(&data)
            .map_err(|e| self.invalid(service, format!("malformed record: {e}")))?;

        if state.current_config.is_empty() || state.previous_config.is_empty() {
            return Err(self.invalid(service, "empty configuration id".to_string()));
        }

        Ok(state)
    }

    /// Write a service's state atomically.
    pub fn save(&self, service: &str, state: &ControlState) -> Result<()> {
        let path = self.path_for(service);
        let json = serde_json::to_vec_pretty(state).context("failed to serialize control state")?;

        let temp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)
            .with_context(|| format!("failed to create temp file {:?}", temp_path))?;
        file.write_all(&json).context("failed to write control state")?;
        file.sync_all().context("failed to sync control state file")?;

        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to rename {:?} to {:?}", temp_path, path))?;

        debug!(service = %service, current = %state.current_config, "Control state persisted");
        Ok(())
    }

    fn invalid(&self, service: &str, reason: String) -> EngineError {
        EngineError::InvalidPersistedState {
            service: service.to_string(),
            reason,
        }
    }
}
