//! Deterministic configuration selection

use crate::error::EngineError;
use crate::models::UtilityScoreSet;

/// Pick the winning configuration id from a score set.
///
/// The maximum score wins. Ties resolve to the lexicographically smallest
/// id — a purely identifier-based tie-break that lands on the cheapest
/// shape because catalog ids are named in ascending cost order.
pub fn select(scores: &UtilityScoreSet) -> Result<String, EngineError> {
    let mut best: Option<(&str, f64)> = None;

    // BTreeMap iterates in id order, so a strict comparison keeps the
    // smallest id among equal scores.
    for (config_id, &score) in scores {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((config_id.as_str(), score)),
        }
    }

    best.map(|(id, _)| id.to_string())
        .ok_or(EngineError::EmptyScoreSet)
}
