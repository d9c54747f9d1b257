//! Error types for the provenance pipeline
//!
//! Four failure policies, one variant each:
//! - configuration problems are fatal and happen before any I/O
//! - malformed references are recovered per item inside the collectors
//! - storage failures surface as phase failures the caller may retry
//! - reporting failures are logged and never escalated

use crate::job::JobId;
use lineage_record::CodecError;

/// Main provenance pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// Missing or unparsable base URL / registry URI
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A single input or file yielded an invalid URI.
    ///
    /// Collectors recover from this locally (skip and continue); it only
    /// escapes when the caller asks for a URI directly.
    #[error("malformed reference: {0}")]
    MalformedReference(String),

    /// Graph store fetch/upload failed
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Report submission failed
    #[error("reporting failed: {0}")]
    Reporting(#[from] DispatchError),

    /// Persisted graph could not be serialized or parsed
    #[error("graph codec failure: {0}")]
    Codec(#[from] CodecError),
}

impl ProvenanceError {
    /// Whether retrying the whole phase can succeed.
    ///
    /// Phase retries are safe because finalization is idempotent.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Storage(StoreError::Unavailable(_)) | Self::Reporting(_)
        )
    }

    /// Whether the error indicates a configuration problem the surrounding
    /// system must fix before any job can proceed
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Errors at the graph store boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No graph has been staged for this job
    #[error("no graph stored for job {0}")]
    NotFound(JobId),

    /// The storage backend could not be reached or rejected the call
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors at the report dispatcher boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The registry answered with a non-success status
    #[error("registry rejected report with status {0}")]
    Rejected(u16),

    /// The registry could not be reached
    #[error("transport failure: {0}")]
    Transport(String),
}
