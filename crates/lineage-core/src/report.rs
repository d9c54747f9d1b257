//! Registry report payload
//!
//! What gets submitted to the external provenance registry once a record is
//! finalized: a serializable view of the activity plus the job name, job id,
//! and the reporting system's own identifying URI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use lineage_record::ActivityRecord;

use crate::identity::ServerIdentity;
use crate::job::{Job, JobId};

/// Serializable view of an activity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityView {
    pub uri: Url,
    pub title: Option<String>,
    pub description: Option<String>,
    pub attributed_to: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// URIs of consumed entities, in deterministic order
    pub used: Vec<Url>,
    /// URIs of produced entities, in deterministic order
    pub generated: Vec<Url>,
}

impl ActivityView {
    /// Project a record into its report view
    #[must_use]
    pub fn from_record(record: &ActivityRecord) -> Self {
        Self {
            uri: record.uri().clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            attributed_to: record.attributed_to.clone(),
            started_at: record.started_at,
            ended_at: record.ended_at,
            used: record.used.uris().cloned().collect(),
            generated: record.generated.uris().cloned().collect(),
        }
    }
}

/// The complete registry submission payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceReport {
    pub job_id: JobId,
    pub job_name: String,
    /// The reporting system's own identifying URI
    pub reporter_uri: Url,
    pub activity: ActivityView,
}

impl ProvenanceReport {
    /// Assemble the report for a finalized activity
    #[must_use]
    pub fn new(job: &Job, activity: &ActivityRecord, identity: &ServerIdentity) -> Self {
        Self {
            job_id: job.id,
            job_name: job.name.clone(),
            reporter_uri: identity.base_url().clone(),
            activity: ActivityView::from_record(activity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_record::{EntityRecord, EntitySet};

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn report_carries_job_and_reporter_identity() {
        let identity = ServerIdentity::new("http://host").unwrap();
        let job = Job::new(JobId::new(1), "Cool Job");
        let used: EntitySet = [EntityRecord::new(uri("http://src/file1"))]
            .into_iter()
            .collect();
        let activity = ActivityRecord::new(uri("http://host/secure/getJobObject.do?jobId=1"))
            .with_used(used)
            .with_completion(Utc::now(), EntitySet::new());

        let report = ProvenanceReport::new(&job, &activity, &identity);
        assert_eq!(report.job_id, JobId::new(1));
        assert_eq!(report.job_name, "Cool Job");
        assert_eq!(report.reporter_uri.as_str(), "http://host/");
        assert_eq!(report.activity.used, vec![uri("http://src/file1")]);
    }

    #[test]
    fn report_round_trips_through_json() {
        let identity = ServerIdentity::new("http://host").unwrap();
        let job = Job::new(JobId::new(3), "job");
        let activity = ActivityRecord::new(uri("http://host/secure/getJobObject.do?jobId=3"))
            .with_completion(Utc::now(), EntitySet::new());

        let report = ProvenanceReport::new(&job, &activity, &identity);
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ProvenanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
