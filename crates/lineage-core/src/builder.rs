//! Phase-1 activity construction
//!
//! Builds the initial activity record at job start: stable URI, metadata,
//! start time, used entities. Pure construction; persistence is the
//! service's job.

use chrono::{DateTime, Utc};
use url::Url;

use lineage_record::ActivityRecord;

use crate::collector::EntityCollector;
use crate::error::ProvenanceError;
use crate::identity::ServerIdentity;
use crate::job::Job;

/// Builds the phase-1 activity record
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityBuilder;

impl ActivityBuilder {
    /// Assemble the start-of-job activity record.
    ///
    /// The activity URI is a pure function of the server identity and job
    /// id; phase 2 recomputes the identical URI. Attribution is the server's
    /// own base URL.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Configuration`] when no activity URI can
    /// be minted. This aborts the whole phase before any I/O.
    pub fn build_start(
        job: &Job,
        identity: &ServerIdentity,
        external_ref: Option<&Url>,
        started_at: DateTime<Utc>,
    ) -> Result<ActivityRecord, ProvenanceError> {
        let uri = identity.activity_uri(job.id)?;
        let used = EntityCollector::collect(job, identity, external_ref);

        let mut activity = ActivityRecord::new(uri)
            .with_title(job.name.clone())
            .with_attribution(identity.base_url().to_string())
            .with_started_at(started_at)
            .with_used(used);
        if let Some(description) = &job.description {
            activity = activity.with_description(description.clone());
        }
        Ok(activity)
    }
}
