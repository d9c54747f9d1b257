//! In-memory graph store
//!
//! Backed by a concurrent map keyed by job id. Each upload replaces the
//! whole entry in one insert, which is exactly the no-partial-writes
//! guarantee the store contract asks for.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::job::JobId;
use crate::ports::GraphStore;

/// [`GraphStore`] held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    graphs: DashMap<JobId, String>,
}

impl MemoryGraphStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs with a staged graph
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether no graphs are staged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upload(&self, job_id: JobId, graph: &str) -> Result<(), StoreError> {
        self.graphs.insert(job_id, graph.to_string());
        Ok(())
    }

    async fn fetch(&self, job_id: JobId) -> Result<String, StoreError> {
        self.graphs
            .get(&job_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(job_id))
    }
}
