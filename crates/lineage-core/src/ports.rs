//! Collaborator boundaries
//!
//! The physical transports live outside this core. [`GraphStore`] stages and
//! retrieves the serialized graph keyed by job id; [`ReportDispatcher`]
//! performs the one-shot submission to an external provenance registry.
//! Both are blocking I/O from the pipeline's point of view: calls are
//! awaited sequentially, failures come back as typed results, and
//! retry/timeout policy stays with the caller.

use async_trait::async_trait;
use url::Url;

use crate::error::{DispatchError, StoreError};
use crate::job::JobId;
use crate::report::ProvenanceReport;

/// Durable staging and retrieval of serialized graphs.
///
/// # Contract
/// - Read-after-write consistency per job id: a fetch after a successful
///   upload returns exactly the uploaded bytes.
/// - No partial writes are ever observable by a fetch.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Persist the serialized graph for a job, replacing any previous one.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] when the backend cannot complete
    /// the write.
    async fn upload(&self, job_id: JobId, graph: &str) -> Result<(), StoreError>;

    /// Retrieve the serialized graph for a job.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no graph has been staged, or
    /// [`StoreError::Unavailable`] when the backend cannot be read.
    async fn fetch(&self, job_id: JobId) -> Result<String, StoreError>;
}

/// One-shot submission of a finalized record to a provenance registry.
///
/// Fire-and-forget from the pipeline's perspective: a failure here is logged
/// by the caller and must never undo or block the already-durable graph
/// upload.
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    /// Submit the report, returning the registry's status code.
    ///
    /// # Errors
    /// Returns [`DispatchError`] on transport failure or registry rejection.
    async fn submit(&self, registry: &Url, report: &ProvenanceReport)
        -> Result<u16, DispatchError>;
}
