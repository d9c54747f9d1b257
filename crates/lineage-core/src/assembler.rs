//! Phase-2 graph finalization
//!
//! Merges classification results into the persisted activity record. The
//! central correctness rule lives here: a candidate already recorded as used
//! can never be reported as generated.

use chrono::{DateTime, Utc};

use lineage_record::{ActivityRecord, EntitySet};

/// Finalizes activity records at job completion
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphAssembler;

impl GraphAssembler {
    /// Produce the finalized record.
    ///
    /// `generated = candidates − prior.used`, by URI. The end time is set to
    /// `completion_time`; every other field of `prior` is carried through
    /// unchanged. Idempotent: identical inputs give identical (byte-equal
    /// once serialized) results, so completion retries never accumulate
    /// duplicate entities.
    #[must_use]
    pub fn finalize(
        prior: &ActivityRecord,
        completion_time: DateTime<Utc>,
        candidates: &EntitySet,
    ) -> ActivityRecord {
        let generated = candidates.difference(&prior.used);
        prior.clone().with_completion(completion_time, generated)
    }
}
