//! Entity collection
//!
//! Turns a job's declared inputs, its staged uploads, and an optional
//! external reference into the used-entity set. A malformed URL in any
//! single item is never fatal: that item is skipped with a warning and
//! collection continues.

use tracing::warn;
use url::Url;

use lineage_record::{EntityRecord, EntitySet};

use crate::identity::ServerIdentity;
use crate::job::Job;

/// Collects the entities a job consumed
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityCollector;

impl EntityCollector {
    /// Build the used-entity set for a job.
    ///
    /// Attribution falls back through: per-item owner, then job owner, then
    /// none. The result is deduplicated by URI; order is not significant.
    #[must_use]
    pub fn collect(job: &Job, identity: &ServerIdentity, external_ref: Option<&Url>) -> EntitySet {
        let mut entities = EntitySet::new();

        for input in &job.declared_inputs {
            match Url::parse(&input.url) {
                Ok(uri) => {
                    let mut entity = EntityRecord::new(uri).with_title(input.name.clone());
                    if let Some(description) = &input.description {
                        entity = entity.with_description(description.clone());
                    }
                    if let Some(owner) = input.owner.as_ref().or(job.owner.as_ref()) {
                        entity = entity.with_attribution(owner.clone());
                    }
                    entities.insert(entity);
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        url = %input.url,
                        error = %e,
                        "skipping declared input with malformed url"
                    );
                }
            }
        }

        for file in &job.staged_files {
            match identity.job_file_uri(job.id, &file.name) {
                Ok(uri) => {
                    let mut entity = EntityRecord::new(uri).with_title(file.name.clone());
                    if let Some(description) = &file.description {
                        entity = entity.with_description(description.clone());
                    }
                    if let Some(owner) = file.owner.as_ref().or(job.owner.as_ref()) {
                        entity = entity.with_attribution(owner.clone());
                    }
                    if let Some(rights) = &file.rights {
                        entity = entity.with_rights(rights.clone());
                    }
                    if let Some(created) = file.created {
                        entity = entity.with_created(created);
                    }
                    entities.insert(entity);
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        file = %file.name,
                        error = %e,
                        "skipping staged file with unusable name"
                    );
                }
            }
        }

        if let Some(uri) = external_ref {
            entities.insert(EntityRecord::new(uri.clone()));
        }

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{DeclaredInput, JobId, StagedFile};

    fn identity() -> ServerIdentity {
        ServerIdentity::new("http://host").unwrap()
    }

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn declared_inputs_become_entities() {
        let job = Job::new(JobId::new(1), "job")
            .with_declared_input(DeclaredInput::new("http://src/file1", "file1"));

        let entities = EntityCollector::collect(&job, &identity(), None);
        assert_eq!(entities.len(), 1);
        assert!(entities.contains_uri(&uri("http://src/file1")));
    }

    #[test]
    fn attribution_falls_back_to_job_owner() {
        let job = Job::new(JobId::new(1), "job")
            .with_owner("mailto:job-owner@test.com")
            .with_declared_input(DeclaredInput::new("http://src/a", "a"))
            .with_declared_input(
                DeclaredInput::new("http://src/b", "b").with_owner("mailto:item@test.com"),
            );

        let entities = EntityCollector::collect(&job, &identity(), None);
        let a = entities.get(&uri("http://src/a")).unwrap();
        let b = entities.get(&uri("http://src/b")).unwrap();
        assert_eq!(a.attributed_to.as_deref(), Some("mailto:job-owner@test.com"));
        assert_eq!(b.attributed_to.as_deref(), Some("mailto:item@test.com"));
    }

    #[test]
    fn malformed_url_is_skipped_not_fatal() {
        let job = Job::new(JobId::new(1), "job")
            .with_declared_input(DeclaredInput::new("::not a url::", "bad"))
            .with_declared_input(DeclaredInput::new("http://src/good", "good"));

        let entities = EntityCollector::collect(&job, &identity(), None);
        assert_eq!(entities.len(), 1);
        assert!(entities.contains_uri(&uri("http://src/good")));
    }

    #[test]
    fn staged_files_carry_rights_and_created() {
        let created = chrono::Utc::now();
        let job = Job::new(JobId::new(2), "job").with_staged_file(
            StagedFile::new("notes.txt")
                .with_rights("CC-BY-4.0")
                .with_created(created)
                .with_owner("mailto:uploader@test.com"),
        );

        let entities = EntityCollector::collect(&job, &identity(), None);
        assert_eq!(entities.len(), 1);
        let entity = entities
            .get(&uri("http://host/secure/jobFile.do?jobId=2&key=notes.txt"))
            .unwrap();
        assert_eq!(entity.rights.as_deref(), Some("CC-BY-4.0"));
        assert_eq!(entity.created, Some(created));
        assert_eq!(entity.attributed_to.as_deref(), Some("mailto:uploader@test.com"));
    }

    #[test]
    fn external_reference_is_included() {
        let job = Job::new(JobId::new(1), "job");
        let solution = uri("http://catalogue/solutions/42");
        let entities = EntityCollector::collect(&job, &identity(), Some(&solution));
        assert!(entities.contains_uri(&solution));
    }

    #[test]
    fn duplicate_urls_are_collapsed() {
        let job = Job::new(JobId::new(1), "job")
            .with_declared_input(DeclaredInput::new("http://src/same", "first"))
            .with_declared_input(DeclaredInput::new("http://src/same", "second"));

        let entities = EntityCollector::collect(&job, &identity(), None);
        assert_eq!(entities.len(), 1);
    }
}
