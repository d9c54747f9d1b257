//! Provenance service
//!
//! Orchestrates the two phases of record assembly against the collaborator
//! boundaries. Per-job processing is strictly sequential: build, upload,
//! and later fetch, classify, finalize, upload, report. The service holds
//! no per-job state; everything derives from the job and what the store
//! returns, which is what makes both phases safely retryable.

use chrono::Utc;
use tracing::{debug, info, warn};
use url::Url;

use lineage_record::{
    EntityRecord, EntitySet, GraphCodec, ProvenanceGraph, TurtleCodec, DESCRIPTOR_FILE_NAME,
};

use crate::assembler::GraphAssembler;
use crate::builder::ActivityBuilder;
use crate::classifier::ArtifactClassifier;
use crate::error::ProvenanceError;
use crate::identity::ServerIdentity;
use crate::job::{CloudFile, Job, JobId};
use crate::ports::{GraphStore, ReportDispatcher};
use crate::report::ProvenanceReport;
use crate::state::ProvenanceState;

/// Assembles, stages and reports provenance records for jobs.
pub struct ProvenanceService<S, R, C = TurtleCodec> {
    identity: ServerIdentity,
    store: S,
    dispatcher: R,
    registry: Option<Url>,
    codec: C,
}

impl<S, R> ProvenanceService<S, R, TurtleCodec>
where
    S: GraphStore,
    R: ReportDispatcher,
{
    /// Create a service with the default Turtle codec.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Configuration`] when the registry URI is
    /// present but unparsable. Fatal before any I/O, like a bad base URL.
    pub fn new(
        identity: ServerIdentity,
        store: S,
        dispatcher: R,
        registry: Option<&str>,
    ) -> Result<Self, ProvenanceError> {
        Self::with_codec(identity, store, dispatcher, registry, TurtleCodec::new())
    }
}

impl<S, R, C> ProvenanceService<S, R, C>
where
    S: GraphStore,
    R: ReportDispatcher,
    C: GraphCodec,
{
    /// Create a service with an explicit codec.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Configuration`] when the registry URI is
    /// present but unparsable.
    pub fn with_codec(
        identity: ServerIdentity,
        store: S,
        dispatcher: R,
        registry: Option<&str>,
        codec: C,
    ) -> Result<Self, ProvenanceError> {
        let registry = registry
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ProvenanceError::Configuration(format!(
                        "registry URI `{raw}` is unparsable: {e}"
                    ))
                })
            })
            .transpose()?;
        Ok(Self {
            identity,
            store,
            dispatcher,
            registry,
            codec,
        })
    }

    /// The identity this service mints URIs from
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Phase 1: record that a job is about to start.
    ///
    /// Collects used entities, builds the activity record, and stages the
    /// serialized graph. Re-entrant: calling again before completion
    /// re-uploads an equivalent record with the same URI and recomputed
    /// used-entities. Returns the serialized graph.
    ///
    /// # Errors
    /// Configuration failures abort before any I/O; storage failures
    /// surface for the caller to retry the whole phase.
    pub async fn record_start(
        &self,
        job: &Job,
        external_ref: Option<&Url>,
    ) -> Result<String, ProvenanceError> {
        let activity = ActivityBuilder::build_start(job, &self.identity, external_ref, Utc::now())?;
        debug!(
            job_id = %job.id,
            used = activity.used.len(),
            "built start-of-job activity record"
        );

        let text = self.codec.serialize(&ProvenanceGraph::new(activity))?;
        self.store.upload(job.id, &text).await?;
        info!(job_id = %job.id, "staged phase-1 provenance graph");
        Ok(text)
    }

    /// Phase 2: finalize the record for a completed job.
    ///
    /// Fetches the staged graph, classifies the given storage listing
    /// (declared-input and staged-upload names are never candidates),
    /// computes the generated set, stages the finalized graph, then attempts
    /// the registry submission. Submission failure is logged and never
    /// escalated; the staged graph is already the system of record.
    ///
    /// Idempotent: re-running against an already-finalized graph re-derives
    /// the same generated set instead of appending duplicates. Returns the
    /// serialized finalized graph.
    ///
    /// # Errors
    /// Storage and codec failures surface as phase failures; the caller may
    /// retry the whole phase.
    pub async fn record_completion(
        &self,
        job: &Job,
        listing: &[CloudFile],
    ) -> Result<String, ProvenanceError> {
        let staged = self.store.fetch(job.id).await?;
        let expected = self.identity.activity_uri(job.id)?;
        let graph = self.codec.parse(&staged, &expected)?;

        let input_names = job.input_names();
        let classification =
            ArtifactClassifier::classify(listing, &input_names, DESCRIPTOR_FILE_NAME);
        debug!(
            job_id = %job.id,
            descriptor = classification.descriptor.len(),
            inputs = classification.declared_inputs.len(),
            candidates = classification.candidates.len(),
            "classified storage listing"
        );

        let candidates = self.candidate_entities(job, &classification.candidates);
        // End time preference: job timestamp, then the end time a previous
        // completion already recorded, so retries stay byte-identical.
        let completion_time = job
            .completed_at
            .or(graph.activity().ended_at)
            .unwrap_or_else(Utc::now);
        let finalized = GraphAssembler::finalize(graph.activity(), completion_time, &candidates);

        let text = self
            .codec
            .serialize(&ProvenanceGraph::new(finalized.clone()))?;
        self.store.upload(job.id, &text).await?;
        info!(
            job_id = %job.id,
            generated = finalized.generated.len(),
            "staged finalized provenance graph"
        );

        if let Some(registry) = &self.registry {
            let report = ProvenanceReport::new(job, &finalized, &self.identity);
            match self.dispatcher.submit(registry, &report).await {
                Ok(status) => {
                    info!(job_id = %job.id, status, "submitted provenance report");
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        error = %e,
                        "report submission failed; staged graph remains the record"
                    );
                }
            }
        }

        Ok(text)
    }

    /// Derive the lifecycle state of a job from the store.
    ///
    /// # Errors
    /// Storage unavailability and unreadable graphs surface as errors; a
    /// missing graph is simply `Unstarted`.
    pub async fn state(&self, job_id: JobId) -> Result<ProvenanceState, ProvenanceError> {
        use crate::error::StoreError;
        match self.store.fetch(job_id).await {
            Ok(text) => {
                let expected = self.identity.activity_uri(job_id)?;
                let graph = self.codec.parse(&text, &expected)?;
                Ok(ProvenanceState::derive(Some(graph.activity())))
            }
            Err(StoreError::NotFound(_)) => Ok(ProvenanceState::Unstarted),
            Err(e) => Err(e.into()),
        }
    }

    /// Mint entities for candidate outputs. A storage key that yields no
    /// valid URI skips that file, same policy as collection.
    fn candidate_entities(&self, job: &Job, candidates: &[CloudFile]) -> EntitySet {
        let mut entities = EntitySet::new();
        for file in candidates {
            match self.identity.job_file_uri(job.id, &file.storage_key) {
                Ok(uri) => {
                    let download = uri.clone();
                    entities.insert(
                        EntityRecord::new(uri)
                            .with_title(file.name.clone())
                            .with_download_url(download),
                    );
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        file = %file.name,
                        error = %e,
                        "skipping candidate with unusable storage key"
                    );
                }
            }
        }
        entities
    }
}
