//! Activity records
//!
//! An activity is the graph node for one job execution: when it ran, who it
//! is attributed to, which entities it used and which it generated. The URI
//! is minted once from the server identity and job id and must be identical
//! across both phases of record assembly.

use chrono::{DateTime, Utc};
use url::Url;

use crate::entity_set::EntitySet;

/// The provenance record of one job execution.
///
/// # Lifecycle
/// - Built at job start with `used` populated and no end time.
/// - Finalized exactly once at completion via [`ActivityRecord::with_completion`],
///   which is the only semantic mutation the record ever sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    uri: Url,
    /// Job name
    pub title: Option<String>,
    /// Job description
    pub description: Option<String>,
    /// Attribution reference for the execution environment
    pub attributed_to: Option<String>,
    /// When the job started
    pub started_at: Option<DateTime<Utc>>,
    /// When the job completed; absent until finalization
    pub ended_at: Option<DateTime<Utc>>,
    /// Entities the job consumed
    pub used: EntitySet,
    /// Entities the job produced; empty until finalization
    pub generated: EntitySet,
}

impl ActivityRecord {
    /// Create a bare activity identified by `uri`
    #[inline]
    #[must_use]
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            title: None,
            description: None,
            attributed_to: None,
            started_at: None,
            ended_at: None,
            used: EntitySet::new(),
            generated: EntitySet::new(),
        }
    }

    /// Activity identity
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With attribution
    #[inline]
    #[must_use]
    pub fn with_attribution(mut self, attributed_to: impl Into<String>) -> Self {
        self.attributed_to = Some(attributed_to.into());
        self
    }

    /// With start time
    #[inline]
    #[must_use]
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// With used-entity set
    #[inline]
    #[must_use]
    pub fn with_used(mut self, used: EntitySet) -> Self {
        self.used = used;
        self
    }

    /// Finalize the record: set the end time and replace the generated set.
    ///
    /// Assignment, not accumulation: repeated finalization with the same
    /// inputs yields an identical record, so completion can be retried after
    /// a transient failure without duplicating generated entities.
    #[must_use]
    pub fn with_completion(mut self, ended_at: DateTime<Utc>, generated: EntitySet) -> Self {
        self.ended_at = Some(ended_at);
        self.generated = generated;
        self
    }

    /// Whether the record carries an end time
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRecord;

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn new_activity_is_not_finalized() {
        let a = ActivityRecord::new(uri("http://host/secure/getJobObject.do?jobId=1"));
        assert!(!a.is_finalized());
        assert!(a.generated.is_empty());
    }

    #[test]
    fn completion_sets_end_time_and_replaces_generated() {
        let now = Utc::now();
        let generated: EntitySet = [EntityRecord::new(uri("http://out/x"))]
            .into_iter()
            .collect();

        let a = ActivityRecord::new(uri("http://host/secure/getJobObject.do?jobId=1"))
            .with_title("job")
            .with_completion(now, generated.clone());

        assert!(a.is_finalized());
        assert_eq!(a.ended_at, Some(now));
        assert_eq!(a.generated, generated);
        assert_eq!(a.title.as_deref(), Some("job"));
    }

    #[test]
    fn repeated_completion_is_idempotent() {
        let now = Utc::now();
        let generated: EntitySet = [EntityRecord::new(uri("http://out/x"))]
            .into_iter()
            .collect();

        let base = ActivityRecord::new(uri("http://host/secure/getJobObject.do?jobId=1"));
        let once = base.clone().with_completion(now, generated.clone());
        let twice = once.clone().with_completion(now, generated);
        assert_eq!(once, twice);
    }
}
