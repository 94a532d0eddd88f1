//! Error taxonomy for the decision engine

use thiserror::Error;

/// Errors that abort a single service's decision cycle.
///
/// Every variant is fatal for that service only: the control loop logs the
/// failure and moves on to the next service. The engine never substitutes a
/// default configuration for a failed decision, since that could silently
/// resize a live workload.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A criterion references a metric with no samples in the window.
    #[error("metric '{metric}' has no samples in the window")]
    MissingMetric { metric: String },

    /// A preference table names a configuration id the catalog does not contain.
    #[error("unknown configuration id '{config_id}'")]
    UnknownConfiguration { config_id: String },

    /// The scorer produced no candidates, which indicates an upstream
    /// configuration error (empty criteria or empty preference tables).
    #[error("utility score set is empty")]
    EmptyScoreSet,

    /// Stored control state could not be read back in a usable form.
    #[error("invalid persisted control state for '{service}': {reason}")]
    InvalidPersistedState { service: String, reason: String },
}

impl EngineError {
    /// Short machine-readable kind, used as a metric/log label.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::MissingMetric { .. } => "missing_metric",
            EngineError::UnknownConfiguration { .. } => "unknown_configuration",
            EngineError::EmptyScoreSet => "empty_score_set",
            EngineError::InvalidPersistedState { .. } => "invalid_persisted_state",
        }
    }
}
