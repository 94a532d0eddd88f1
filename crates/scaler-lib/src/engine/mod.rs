//! The per-service decision engine
//!
//! One evaluation runs the full pipeline for a single service: window
//! aggregation, utility scoring, deterministic selection, and the
//! hysteresis gate. The engine holds no state of its own; the caller
//! supplies the window, the static definitions, and the persisted control
//! state, and writes the mutated state back afterwards.

mod aggregate;
mod hysteresis;
mod score;
mod select;

pub use aggregate::aggregate;
pub use hysteresis::{advance, Transition};
pub use score::score;
pub use select::select;

use crate::catalog::ConfigurationCatalog;
use crate::criteria::{referenced_metrics, UtilityCriterion};
use crate::error::EngineError;
use crate::models::{ControlState, MetricWindow, ReconfigureRequest, UtilityScoreSet};
use serde::{Deserialize, Serialize};

/// Identifies the workload a decision applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub service: String,
    pub namespace: String,
}

impl ServiceTarget {
    pub fn new(service: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            namespace: namespace.into(),
        }
    }
}

/// Outcome of one service's evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub scores: UtilityScoreSet,
    pub candidate: String,
    pub transition: Transition,
    /// Present exactly when the transition is `Apply`.
    pub request: Option<ReconfigureRequest>,
}

/// Run the decision pipeline for one service.
///
/// On any error the persisted state is left untouched; the candidate's
/// resources are resolved before the state machine advances so a failure
/// cannot leave a half-applied transition behind.
pub fn evaluate(
    target: &ServiceTarget,
    window: &MetricWindow,
    criteria: &[UtilityCriterion],
    catalog: &ConfigurationCatalog,
    state: &mut ControlState,
) -> Result<Evaluation, EngineError> {
    let metrics = referenced_metrics(criteria);
    let aggregated = aggregate(window, metrics)?;
    let scores = score(&aggregated, criteria, catalog)?;
    let candidate = select(&scores)?;
    let resources = catalog.resolve(&candidate)?.clone();

    let transition = advance(state, &candidate);
    let request = match transition {
        Transition::Apply => Some(ReconfigureRequest {
            service: target.service.clone(),
            namespace: target.namespace.clone(),
            config_id: candidate.clone(),
            resources,
        }),
        Transition::Hold => None,
    };

    Ok(Evaluation {
        scores,
        candidate,
        transition,
        request,
    })
}
