//! Testing utilities for the lineage workspace
//!
//! Shared fixtures and collaborator doubles.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use url::Url;

use lineage_core::{
    CloudFile, DeclaredInput, DispatchError, GraphStore, Job, JobId, MemoryGraphStore,
    ProvenanceReport, ProvenanceService, ReportDispatcher, ServerIdentity, StoreError,
};
use lineage_record::DESCRIPTOR_FILE_NAME;

pub const TEST_BASE_URL: &str = "http://host";
pub const TEST_REGISTRY_URI: &str = "http://registry/reports";

pub fn sample_identity() -> ServerIdentity {
    ServerIdentity::new(TEST_BASE_URL).unwrap()
}

pub fn fixed_completion_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 3, 10, 11, 0, 0).unwrap()
}

/// The job from the reference scenario: id 1, one declared input `file1`.
pub fn scenario_job() -> Job {
    Job::new(JobId::new(1), "Cool Job")
        .with_description("Some job I made.")
        .with_owner("mailto:foo@test.com")
        .with_declared_input(DeclaredInput::new("http://src/file1", "file1"))
        .with_completed_at(fixed_completion_time())
        .with_storage_service_id("fluffy-cloud")
}

/// Post-execution storage listing for the reference scenario.
pub fn completion_listing() -> Vec<CloudFile> {
    vec![
        CloudFile::new("file1", "file1", 10),
        CloudFile::new(DESCRIPTOR_FILE_NAME, DESCRIPTOR_FILE_NAME, 5),
        CloudFile::new("output.png", "output.png", 2048),
    ]
}

/// Dispatcher double that records every submission and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    inner: Arc<RecordingInner>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    submissions: Mutex<Vec<(Url, ProvenanceReport)>>,
    fail: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let dispatcher = Self::default();
        dispatcher.inner.fail.store(true, Ordering::SeqCst);
        dispatcher
    }

    pub fn set_failing(&self, fail: bool) {
        self.inner.fail.store(fail, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<(Url, ProvenanceReport)> {
        self.inner.submissions.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportDispatcher for RecordingDispatcher {
    async fn submit(
        &self,
        registry: &Url,
        report: &ProvenanceReport,
    ) -> Result<u16, DispatchError> {
        if self.inner.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Transport("simulated outage".to_string()));
        }
        self.inner
            .submissions
            .lock()
            .unwrap()
            .push((registry.clone(), report.clone()));
        Ok(201)
    }
}

/// Store wrapper that fails the next `n` uploads, then delegates.
#[derive(Debug)]
pub struct FlakyGraphStore<S> {
    inner: S,
    failures_left: AtomicUsize,
}

impl<S: GraphStore> FlakyGraphStore<S> {
    pub fn new(inner: S, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl<S: GraphStore> GraphStore for FlakyGraphStore<S> {
    async fn upload(&self, job_id: JobId, graph: &str) -> Result<(), StoreError> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        self.inner.upload(job_id, graph).await
    }

    async fn fetch(&self, job_id: JobId) -> Result<String, StoreError> {
        self.inner.fetch(job_id).await
    }
}

/// A fully wired service over in-memory collaborators, plus a handle to the
/// dispatcher for asserting on submissions.
pub fn setup_service() -> (
    ProvenanceService<MemoryGraphStore, RecordingDispatcher>,
    RecordingDispatcher,
) {
    let dispatcher = RecordingDispatcher::new();
    let service = ProvenanceService::new(
        sample_identity(),
        MemoryGraphStore::new(),
        dispatcher.clone(),
        Some(TEST_REGISTRY_URI),
    )
    .unwrap();
    (service, dispatcher)
}
