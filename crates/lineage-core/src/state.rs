//! Per-job provenance lifecycle
//!
//! `Unstarted → Started → Completed`, with two deliberate self-loops:
//! re-entrant start before completion re-uploads an equivalent record, and
//! repeated completion re-finalizes idempotently after a partial failure.
//! State is derived from what the store holds, never tracked in memory; the
//! core keeps no shared mutable state across jobs.

use serde::{Deserialize, Serialize};

use lineage_record::ActivityRecord;

/// Lifecycle state of one job's provenance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceState {
    /// No graph staged yet
    Unstarted,
    /// Phase-1 graph staged, no end time
    Started,
    /// Finalized graph staged; terminal apart from idempotent re-completion
    Completed,
}

impl ProvenanceState {
    /// Derive the state from what the store returned for a job
    #[must_use]
    pub fn derive(record: Option<&ActivityRecord>) -> Self {
        match record {
            None => Self::Unstarted,
            Some(r) if r.is_finalized() => Self::Completed,
            Some(_) => Self::Started,
        }
    }
}

/// Attempted transition outside the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal provenance transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: ProvenanceState,
    pub to: ProvenanceState,
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: ProvenanceState) -> Vec<ProvenanceState> {
    use ProvenanceState::*;
    match from {
        Unstarted => vec![Started],
        Started => vec![Started, Completed],
        Completed => vec![Completed],
    }
}

/// Validates a lifecycle transition.
///
/// # Errors
/// Returns [`TransitionError`] when the step is outside the lifecycle.
pub fn validate_transition(
    from: ProvenanceState,
    to: ProvenanceState,
) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lineage_record::EntitySet;
    use url::Url;

    #[test]
    fn start_is_reentrant() {
        assert!(validate_transition(ProvenanceState::Started, ProvenanceState::Started).is_ok());
    }

    #[test]
    fn completion_is_repeatable() {
        assert!(
            validate_transition(ProvenanceState::Completed, ProvenanceState::Completed).is_ok()
        );
    }

    #[test]
    fn cannot_complete_before_start() {
        assert!(
            validate_transition(ProvenanceState::Unstarted, ProvenanceState::Completed).is_err()
        );
    }

    #[test]
    fn cannot_restart_after_completion() {
        assert!(
            validate_transition(ProvenanceState::Completed, ProvenanceState::Started).is_err()
        );
    }

    #[test]
    fn derive_follows_record_shape() {
        assert_eq!(ProvenanceState::derive(None), ProvenanceState::Unstarted);

        let uri = Url::parse("http://host/a?jobId=1").unwrap();
        let started = ActivityRecord::new(uri.clone());
        assert_eq!(
            ProvenanceState::derive(Some(&started)),
            ProvenanceState::Started
        );

        let finalized = started.with_completion(Utc::now(), EntitySet::new());
        assert_eq!(
            ProvenanceState::derive(Some(&finalized)),
            ProvenanceState::Completed
        );
    }
}
