//! Job model
//!
//! The job and its file metadata are owned by the surrounding job-management
//! system; this core reads them and never writes them back. Ids are the
//! numeric ids that system mints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric job identifier assigned by the job-management system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JobId(u64);

impl JobId {
    /// Wrap a raw job id
    #[inline]
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A data source the job declares before execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredInput {
    /// Source URL as supplied by the user; may be malformed
    pub url: String,
    /// File name the download lands under in the storage namespace
    pub name: String,
    /// Owner of the source dataset
    pub owner: Option<String>,
    /// Containing dataset or catalogue URL
    pub parent_url: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

impl DeclaredInput {
    /// Create a declared input from its URL and landing name
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            owner: None,
            parent_url: None,
            description: None,
        }
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// With parent URL
    #[inline]
    #[must_use]
    pub fn with_parent_url(mut self, parent_url: impl Into<String>) -> Self {
        self.parent_url = Some(parent_url.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Metadata for a file the user uploaded into the job before it ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    /// File name in the storage namespace
    pub name: String,
    /// Owner of the uploaded file
    pub owner: Option<String>,
    /// Rights / copyright reference
    pub rights: Option<String>,
    /// When the file was created
    pub created: Option<DateTime<Utc>>,
    /// Free-text description
    pub description: Option<String>,
}

impl StagedFile {
    /// Create staged-file metadata from its name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            rights: None,
            created: None,
            description: None,
        }
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// With rights reference
    #[inline]
    #[must_use]
    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = Some(rights.into());
        self
    }

    /// With creation date
    #[inline]
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One element of the job's cloud storage listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFile {
    /// File name within the namespace
    pub name: String,
    /// Backend storage key (what retrieval URLs are minted from)
    pub storage_key: String,
    /// Size in bytes
    pub size: u64,
}

impl CloudFile {
    /// Describe one stored file
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, storage_key: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            storage_key: storage_key.into(),
            size,
        }
    }
}

/// A computational job, read-only from the provenance core's perspective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Identifier assigned by the job-management system
    pub id: JobId,
    /// Job name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Owner identity (e.g. a `mailto:` address)
    pub owner: Option<String>,
    /// Data sources declared before execution
    pub declared_inputs: Vec<DeclaredInput>,
    /// Files uploaded by the user before execution
    pub staged_files: Vec<StagedFile>,
    /// When the job finished processing; absent while running
    pub completed_at: Option<DateTime<Utc>>,
    /// Which storage backend holds the job's namespace
    pub storage_service_id: String,
}

impl Job {
    /// Create a job with the given id and name
    #[inline]
    #[must_use]
    pub fn new(id: JobId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            owner: None,
            declared_inputs: Vec::new(),
            staged_files: Vec::new(),
            completed_at: None,
            storage_service_id: String::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With owner identity
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// With a declared input appended
    #[inline]
    #[must_use]
    pub fn with_declared_input(mut self, input: DeclaredInput) -> Self {
        self.declared_inputs.push(input);
        self
    }

    /// With a staged file appended
    #[inline]
    #[must_use]
    pub fn with_staged_file(mut self, file: StagedFile) -> Self {
        self.staged_files.push(file);
        self
    }

    /// With completion timestamp
    #[inline]
    #[must_use]
    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// With storage backend id
    #[inline]
    #[must_use]
    pub fn with_storage_service_id(mut self, id: impl Into<String>) -> Self {
        self.storage_service_id = id.into();
        self
    }

    /// Names of all declared inputs, for classification
    #[must_use]
    pub fn declared_names(&self) -> Vec<String> {
        self.declared_inputs
            .iter()
            .map(|input| input.name.clone())
            .collect()
    }

    /// Names of every file the job consumed: declared inputs plus staged
    /// uploads. Classification excludes all of them from candidacy; a staged
    /// upload may be listed under a prefixed storage key, so matching by
    /// minted URI alone would miss it.
    #[must_use]
    pub fn input_names(&self) -> Vec<String> {
        let mut names = self.declared_names();
        names.extend(self.staged_files.iter().map(|file| file.name.clone()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_display_is_raw_number() {
        assert_eq!(JobId::new(42).to_string(), "42");
    }

    #[test]
    fn declared_names_follow_input_order() {
        let job = Job::new(JobId::new(1), "job")
            .with_declared_input(DeclaredInput::new("http://src/b", "b"))
            .with_declared_input(DeclaredInput::new("http://src/a", "a"));
        assert_eq!(job.declared_names(), vec!["b", "a"]);
    }

    #[test]
    fn input_names_include_staged_uploads() {
        let job = Job::new(JobId::new(1), "job")
            .with_declared_input(DeclaredInput::new("http://src/a", "a"))
            .with_staged_file(StagedFile::new("notes.txt"));
        assert_eq!(job.input_names(), vec!["a", "notes.txt"]);
    }
}
