//! Provenance graph and the codec seam
//!
//! [`ProvenanceGraph`] wraps exactly one activity record together with its
//! entities; it is what gets persisted as the descriptor artifact in the
//! job's storage namespace. [`GraphCodec`] is the minimal capability the
//! pipeline needs from any graph representation: serialize and parse. The
//! classification and merge logic never sees the wire format.

use url::Url;

use crate::activity::ActivityRecord;

/// Name of the descriptor artifact stored alongside job outputs.
pub const DESCRIPTOR_FILE_NAME: &str = "activity.ttl";

/// One job's provenance graph: the activity plus its related entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceGraph {
    activity: ActivityRecord,
}

impl ProvenanceGraph {
    /// Wrap an activity record
    #[inline]
    #[must_use]
    pub fn new(activity: ActivityRecord) -> Self {
        Self { activity }
    }

    /// The activity record
    #[inline]
    #[must_use]
    pub fn activity(&self) -> &ActivityRecord {
        &self.activity
    }

    /// Unwrap the activity record
    #[inline]
    #[must_use]
    pub fn into_activity(self) -> ActivityRecord {
        self.activity
    }

    /// Total number of distinct entities across used and generated sets.
    ///
    /// The sets are disjoint by construction, so this is a plain sum.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.activity.used.len() + self.activity.generated.len()
    }
}

/// Errors from graph serialization and parsing
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// No activity statement found in the document
    #[error("no activity found in graph document")]
    MissingActivity,

    /// Activity URI in the document differs from the expected one
    #[error("activity mismatch: expected {expected}, found {found}")]
    ActivityMismatch {
        expected: Box<Url>,
        found: Box<Url>,
    },

    /// A statement could not be parsed
    #[error("malformed statement at line {line}: {reason}")]
    MalformedStatement { line: usize, reason: String },

    /// A resource reference is not a valid URI
    #[error("invalid uri {uri}: {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// A timestamp literal is not valid RFC 3339
    #[error("invalid timestamp {value}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// Minimal graph representation capability.
///
/// Round-trip fidelity is the contract: `parse(serialize(g))` must preserve
/// the activity URI and the used-entity set (same URIs, same cardinality).
pub trait GraphCodec: Send + Sync {
    /// Serialize a graph to its textual encoding
    ///
    /// # Errors
    /// Returns an error if the graph cannot be represented.
    fn serialize(&self, graph: &ProvenanceGraph) -> Result<String, CodecError>;

    /// Parse a textual encoding back into a graph.
    ///
    /// `expected_activity` is the URI the caller minted for the job; a
    /// document describing a different activity is rejected.
    ///
    /// # Errors
    /// Returns an error on malformed documents or mismatched activity URIs.
    fn parse(&self, text: &str, expected_activity: &Url) -> Result<ProvenanceGraph, CodecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRecord;
    use crate::entity_set::EntitySet;

    #[test]
    fn entity_count_sums_disjoint_sets() {
        let used: EntitySet = [
            EntityRecord::new(Url::parse("http://src/a").unwrap()),
            EntityRecord::new(Url::parse("http://src/b").unwrap()),
        ]
        .into_iter()
        .collect();
        let generated: EntitySet = [EntityRecord::new(Url::parse("http://out/x").unwrap())]
            .into_iter()
            .collect();

        let activity = ActivityRecord::new(Url::parse("http://host/a?jobId=1").unwrap())
            .with_used(used)
            .with_completion(chrono::Utc::now(), generated);

        assert_eq!(ProvenanceGraph::new(activity).entity_count(), 3);
    }
}
