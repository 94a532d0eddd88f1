//! One-cycle hysteresis over configuration changes
//!
//! A newly preferred configuration must win two consecutive cycles before it
//! is applied, so metrics fluctuating around a threshold boundary cannot
//! flap the deployment. Returning to the already-active configuration is a
//! no-op and needs no debounce. The debounce is cycle-counted, never
//! wall-clock.

use crate::models::ControlState;

/// Outcome of advancing the hysteresis machine by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current configuration this cycle.
    Hold,
    /// Apply the candidate configuration.
    Apply,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Hold => "hold",
            Transition::Apply => "apply",
        }
    }
}

/// Advance the state machine with this cycle's winning candidate.
///
/// Hold when the candidate already runs, or when a change landed last cycle
/// (current != previous) and the cluster is still settling; either way the
/// divergent memory collapses so the next cycle may act. Otherwise the
/// candidate has been stable for a full cycle: record the change and apply.
/// The caller persists the mutated state exactly once per cycle.
pub fn advance(state: &mut ControlState, latest: &str) -> Transition {
    if latest == state.current_config || state.is_settling() {
        state.previous_config = state.current_config.clone();
        Transition::Hold
    } else {
        state.previous_config = state.current_config.clone();
        state.current_config = latest.to_string();
        Transition::Apply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_state_holds() {
        let mut state = ControlState::initial("C1");
        assert_eq!(advance(&mut state, "C1"), Transition::Hold);
        assert_eq!(state, ControlState::initial("C1"));
    }

    #[test]
    fn test_new_candidate_applies_after_one_stable_cycle() {
        let mut state = ControlState::initial("C1");

        assert_eq!(advance(&mut state, "C2"), Transition::Apply);
        assert_eq!(state.current_config, "C2");
        assert_eq!(state.previous_config, "C1");
    }

    #[test]
    fn test_settling_cycle_holds_and_collapses() {
        // A change landed last cycle: current and previous differ.
        let mut state = ControlState {
            current_config: "C2".to_string(),
            previous_config: "C1".to_string(),
        };

        assert_eq!(advance(&mut state, "C3"), Transition::Hold);
        assert_eq!(state.current_config, "C2");
        assert_eq!(state.previous_config, "C2");
    }

    #[test]
    fn test_three_cycle_scenario() {
        // From {current: A, previous: A} with candidate B each cycle:
        // the settled machine applies on the first divergent candidate,
        // holds on the settling cycle, then holds steady once B runs.
        let mut state = ControlState::initial("A");

        assert_eq!(advance(&mut state, "B"), Transition::Apply);
        assert_eq!(state.current_config, "B");
        assert_eq!(state.previous_config, "A");

        assert_eq!(advance(&mut state, "B"), Transition::Hold);
        assert_eq!(state.current_config, "B");
        assert_eq!(state.previous_config, "B");

        assert_eq!(advance(&mut state, "B"), Transition::Hold);
        assert_eq!(state.current_config, "B");
        assert_eq!(state.previous_config, "B");
    }

    #[test]
    fn test_flapping_candidates_alternate_apply_and_settle() {
        let mut state = ControlState::initial("A");

        // Candidate flips to B: applied (machine was settled on A).
        assert_eq!(advance(&mut state, "B"), Transition::Apply);
        // Candidate flips back to A: held, the B change is still settling.
        assert_eq!(advance(&mut state, "A"), Transition::Hold);
        assert!(!state.is_settling());
        // Now settled on B; a stable A candidate applies.
        assert_eq!(advance(&mut state, "A"), Transition::Apply);
        assert_eq!(state.current_config, "A");
        assert_eq!(state.previous_config, "B");
    }

    #[test]
    fn test_candidate_equal_to_current_while_settling() {
        let mut state = ControlState {
            current_config: "C2".to_string(),
            previous_config: "C1".to_string(),
        };

        assert_eq!(advance(&mut state, "C2"), Transition::Hold);
        assert_eq!(state.previous_config, "C2");
    }
}
